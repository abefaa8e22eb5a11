use plotters::prelude::*;
use std::path::Path;
use crate::fit::EmError;
use crate::fit::em::Trace;

/// Layout of the diagnostic chart. The default matches a 16x10 inch figure at 100 dpi.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width : u32,
    pub height : u32,
    pub title : String,
    pub y_label : String,
    pub marker_size : i32
}

impl Default for PlotOptions {

    fn default() -> Self {
        Self {
            width : 1600,
            height : 1000,
            title : String::from("Expectation Maximisation Algorithm"),
            y_label : String::from("Parameter Value"),
            marker_size : 5
        }
    }

}

fn plot_err<E : std::fmt::Display>(e : E) -> EmError {
    EmError::Plot(format!("{}", e))
}

/// Vertical range covering all estimates with a 5% margin; (0, 1) for an empty trace.
fn value_range(estimates : &[f64]) -> (f64, f64) {
    let (lo, hi) = estimates.iter()
        .filter(|v| v.is_finite() )
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)) );
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

/// Scatter plot of each estimate against its (zero-based) iteration index, with the
/// x axis labelled by the total number of iterations. The image format follows
/// the extension of path (png, bmp, ...).
pub fn render_trace<P>(trace : &Trace<f64>, path : P, opts : &PlotOptions) -> Result<(), EmError>
where
    P : AsRef<Path>
{
    let estimates = trace.estimates();
    let (y_min, y_max) = value_range(estimates);
    let x_max = (estimates.len().max(2) - 1) as f64 + 0.5;

    let root = BitMapBackend::new(path.as_ref(), (opts.width, opts.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&opts.title, ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart.configure_mesh()
        .disable_mesh()
        .x_desc(format!("Iterations = {}", trace.iterations()))
        .y_desc(&opts.y_label)
        .axis_desc_style(("sans-serif", 28))
        .draw()
        .map_err(plot_err)?;

    chart.draw_series(
        estimates.iter()
            .enumerate()
            .map(|(ix, psi)| Circle::new((ix as f64, *psi), opts.marker_size, BLUE.filled()) )
    ).map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
