use serde::{Serialize, Deserialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use crate::fit::{EmConfig, EmError};
use crate::fit::em::Trace;
use crate::model::Counts;

/// Summary of a single solve, as written by the command line utility next to the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {

    /// Observed counts (y1, y2, y3, y4).
    pub counts : [f64; 4],

    pub total : f64,

    pub config : EmConfig<f64>,

    pub iterations : usize,

    /// Final estimate; absent when the loop never ran.
    pub estimate : Option<f64>,

    pub estimates : Vec<f64>

}

impl Report {

    pub fn new(counts : &Counts<f64>, config : &EmConfig<f64>, trace : &Trace<f64>) -> Self {
        Self {
            counts : counts.as_array(),
            total : counts.total(),
            config : *config,
            iterations : trace.iterations(),
            estimate : trace.last(),
            estimates : trace.estimates().to_vec()
        }
    }

    pub fn load<R>(mut reader : R) -> Result<Self, EmError>
    where
        R : Read
    {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(serde_json::from_str(&content[..])?)
    }

    pub fn save<W>(&self, mut writer : W) -> Result<(), EmError>
    where
        W : Write
    {
        let content = serde_json::to_string_pretty(self)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }

}

pub fn write_report_json<P>(report : &Report, path : P) -> Result<(), EmError>
where
    P : AsRef<Path>
{
    let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    report.save(file)
}

/// Writes the trace as (iteration, psi) rows, with iterations counted from one.
pub fn write_trace<W>(trace : &Trace<f64>, writer : W) -> Result<(), EmError>
where
    W : Write
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&["iteration", "psi"])?;
    for (ix, psi) in trace.estimates().iter().enumerate() {
        wtr.write_record(&[(ix + 1).to_string(), psi.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_trace_csv<P>(trace : &Trace<f64>, path : P) -> Result<(), EmError>
where
    P : AsRef<Path>
{
    let file = File::create(path)?;
    write_trace(trace, file)
}

/// Reads back the psi column of a file written by write_trace_csv.
pub fn read_trace_csv<P>(path : P) -> Result<Vec<f64>, EmError>
where
    P : AsRef<Path>
{
    let mut rdr = csv::Reader::from_path(path)?;
    let mut estimates = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let psi = record.get(1)
            .and_then(|v| v.parse::<f64>().ok() )
            .ok_or_else(|| EmError::InvalidTrace(format!("Invalid row: {:?}", record)) )?;
        estimates.push(psi);
    }
    Ok(estimates)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::fit::em::solve;

    #[test]
    fn trace_csv_layout() {
        let trace = solve::<f64>(125.0, 18.0, 20.0, 34.0, 1e-9, 0.1).unwrap();
        let mut buf = Vec::new();
        write_trace(&trace, &mut buf).unwrap();
        let content = String::from_utf8(buf).unwrap();
        let lines : Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "iteration,psi");
        assert_eq!(lines.len(), trace.iterations() + 1);
        assert!(lines[1].starts_with("1,0.5125"));
    }

    #[test]
    fn report_json() {
        let counts = Counts::default();
        let config = EmConfig::new(1e-9, 0.1);
        let trace = solve::<f64>(125.0, 18.0, 20.0, 34.0, 1e-9, 0.1).unwrap();
        let report = Report::new(&counts, &config, &trace);
        let mut buf = Vec::new();
        report.save(&mut buf).unwrap();
        let back = Report::load(&buf[..]).unwrap();
        assert_eq!(back.iterations, trace.iterations());
        assert_eq!(back.estimate, trace.last());
        assert_eq!(back.total, 197.0);
    }

}
