use num_traits::Float;
use serde_json::{self, Value, Map};
use std::convert::TryFrom;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;
use crate::fit::EmError;

/// The four observed phenotype frequencies of Fisher's linkage problem. The categories
/// have multinomial probabilities (1/2 + psi/4, (1 - psi)/4, (1 - psi)/4, psi/4); the first
/// one is the sum of two unobserved categories with probabilities 1/2 and psi/4, which is
/// what makes the problem a natural candidate for expectation maximization.
///
/// The total n = y1 + y2 + y3 + y4 is computed once at construction, so it stays fixed for as
/// long as the counts are used by an estimator. Counts can be read from JSON:
///
/// ```json
/// { "y1" : 125, "y2" : 18, "y3" : 20, "y4" : 34 }
/// ```
///
/// or from a comma-separated list ("125,18,20,34").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Counts<F = f64> {
    y : [F; 4],
    total : F
}

/// The four counts from Fisher's original linkage data.
pub const FISHER_COUNTS : [f64; 4] = [125.0, 18.0, 20.0, 34.0];

impl<F> Counts<F>
    where F : Float
{

    pub fn new(y1 : F, y2 : F, y3 : F, y4 : F) -> Self {
        Self { y : [y1, y2, y3, y4], total : y1 + y2 + y3 + y4 }
    }

    pub fn y1(&self) -> F {
        self.y[0]
    }

    pub fn y2(&self) -> F {
        self.y[1]
    }

    pub fn y3(&self) -> F {
        self.y[2]
    }

    pub fn y4(&self) -> F {
        self.y[3]
    }

    /// Returns n = y1 + y2 + y3 + y4.
    pub fn total(&self) -> F {
        self.total
    }

    pub fn as_array(&self) -> [F; 4] {
        self.y
    }

    pub fn load_from_path<P>(path : P) -> Result<Self, EmError>
    where
        P : AsRef<Path>
    {
        let f = File::open(path)?;
        Self::load(f)
    }

    pub fn load<R>(mut reader : R) -> Result<Self, EmError>
    where
        R : Read
    {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let val : Value = serde_json::from_str(&content[..])?;
        Self::try_from(val)
    }

    pub fn save_to_path<P>(&self, path : P) -> Result<(), EmError>
    where
        P : AsRef<Path>
    {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        self.save(file)
    }

    pub fn save<W>(&self, mut writer : W) -> Result<(), EmError>
    where
        W : Write
    {
        let val : Value = (*self).into();
        let content = serde_json::to_string_pretty(&val)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }

}

impl<F> Default for Counts<F>
    where F : Float
{

    fn default() -> Self {
        let y = FISHER_COUNTS.iter()
            .map(|c| F::from(*c).unwrap_or_else(F::nan) )
            .collect::<Vec<_>>();
        Self::new(y[0], y[1], y[2], y[3])
    }

}

fn parse_count<F>(s : &str) -> Result<F, EmError>
    where F : Float
{
    let v : f64 = s.trim().parse()
        .map_err(|_| EmError::InvalidCounts(format!("{} is not a number", s.trim())) )?;
    F::from(v).ok_or_else(|| EmError::InvalidCounts(format!("{} is not representable", v)) )
}

impl<F> FromStr for Counts<F>
    where F : Float
{

    type Err = EmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let y = s.split(',')
            .map(|c| parse_count(c) )
            .collect::<Result<Vec<F>, _>>()?;
        match &y[..] {
            [y1, y2, y3, y4] => Ok(Self::new(*y1, *y2, *y3, *y4)),
            _ => Err(EmError::InvalidCounts(format!("Expected 4 counts, found {}", y.len())))
        }
    }

}

impl<F> fmt::Display for Counts<F>
    where F : Float + Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y = ({}, {}, {}, {}); n = {}", self.y[0], self.y[1], self.y[2], self.y[3], self.total)
    }
}

impl<F> TryFrom<Value> for Counts<F>
    where F : Float
{

    type Error = EmError;

    fn try_from(val : Value) -> Result<Self, EmError> {
        let obj = val.as_object()
            .ok_or_else(|| EmError::InvalidCounts(String::from("Expected object with fields y1..y4")) )?;
        let mut y = [F::zero(); 4];
        for (i, c) in y.iter_mut().enumerate() {
            let key = format!("y{}", i + 1);
            let v = obj.get(&key)
                .and_then(|v| v.as_f64() )
                .ok_or_else(|| EmError::InvalidCounts(format!("Missing numeric field {}", key)) )?;
            *c = F::from(v).ok_or_else(|| EmError::InvalidCounts(format!("{} is not representable", v)) )?;
        }
        Ok(Self::new(y[0], y[1], y[2], y[3]))
    }

}

impl<F> From<Counts<F>> for Value
    where F : Float
{

    fn from(counts : Counts<F>) -> Value {
        let mut obj = Map::new();
        for (i, c) in counts.y.iter().enumerate() {
            obj.insert(format!("y{}", i + 1), c.to_f64().map(Value::from).unwrap_or(Value::Null));
        }
        Value::Object(obj)
    }

}
