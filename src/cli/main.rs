use fisher::fit::em::ExpectMax;
use fisher::fit::{EmConfig, Estimator};
use fisher::io::{self, Report};
use fisher::model::Counts;
use fisher::plot::{self, PlotOptions};
use std::path::PathBuf;
use structopt::*;
use tracing::info;

/// Estimate the linkage parameter of Fisher's four-category multinomial model
/// via expectation maximization, and plot the trajectory of the estimates.
#[derive(StructOpt, Debug)]
#[structopt(name = "fisher")]
pub struct Fisher {

    /// Comma-separated observed counts y1,y2,y3,y4
    #[structopt(default_value = "125,18,20,34")]
    counts : Counts,

    /// JSON file with fields y1..y4 (takes precedence over the positional counts)
    #[structopt(long = "counts-file", parse(from_os_str))]
    counts_file : Option<PathBuf>,

    /// JSON configuration file (tolerance, initial_guess, max_iter)
    #[structopt(short, long, parse(from_os_str))]
    config : Option<PathBuf>,

    /// Stopping tolerance (default 1e-9 unless set by the configuration file)
    #[structopt(short, long)]
    tol : Option<f64>,

    /// Initial guess for psi (default 0.1 unless set by the configuration file)
    #[structopt(short, long)]
    start : Option<f64>,

    /// Abort with an error after this many iterations without convergence
    #[structopt(long = "max-iter")]
    max_iter : Option<usize>,

    /// Output image for the estimate trajectory
    #[structopt(short, long, parse(from_os_str), default_value = "em_fisher.png")]
    plot : PathBuf,

    /// Optional CSV output with one (iteration, psi) row per iteration
    #[structopt(long, parse(from_os_str))]
    trace : Option<PathBuf>,

    /// Optional JSON summary of the run
    #[structopt(long, parse(from_os_str))]
    report : Option<PathBuf>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[structopt(long = "log-level", default_value = "warn")]
    log_level : tracing::Level

}

impl Fisher {

    /// Without a configuration file, the run reproduces Fisher's example (tolerance 1e-9,
    /// starting at 0.1). Command line flags take precedence over the file.
    fn config(&self) -> anyhow::Result<EmConfig> {
        let mut cfg = match &self.config {
            Some(path) => EmConfig::load_from_path(path)?,
            None => EmConfig::new(1e-9, 0.1)
        };
        if let Some(tol) = self.tol {
            cfg.tolerance = tol;
        }
        if let Some(start) = self.start {
            cfg.initial_guess = start;
        }
        if self.max_iter.is_some() {
            cfg.max_iter = self.max_iter;
        }
        Ok(cfg)
    }

    fn counts(&self) -> anyhow::Result<Counts> {
        match &self.counts_file {
            Some(path) => Ok(Counts::load_from_path(path)?),
            None => Ok(self.counts)
        }
    }

}

fn main() -> anyhow::Result<()> {
    let args = Fisher::from_args();
    tracing_subscriber::fmt().with_max_level(args.log_level).with_target(false).init();

    let counts = args.counts()?;
    let config = args.config()?;
    info!(%counts, tolerance = config.tolerance, initial_guess = config.initial_guess, "Starting EM");

    let mut em = ExpectMax::new(config);
    let trace = em.fit(&counts)?;

    plot::render_trace(trace, &args.plot, &PlotOptions::default())?;
    info!(path = %args.plot.display(), "Saved plot");
    if let Some(path) = &args.trace {
        io::write_trace_csv(trace, path)?;
    }
    if let Some(path) = &args.report {
        io::write_report_json(&Report::new(&counts, &config, trace), path)?;
    }

    println!("The number of iterations required for convergence: {}", trace.iterations());
    Ok(())
}
