use fisher::fit::em::*;
use fisher::fit::{EmConfig, EmError, Estimator};
use fisher::model::Counts;
use fisher::io;
use rand::Rng;
use std::env;

const EPS : f64 = 10E-8;

fn temp_path(name : &str) -> std::path::PathBuf {
    env::temp_dir().join(format!("fisher-{}-{}", std::process::id(), name))
}

#[test]
fn reference_scenario() {
    let trace = solve::<f64>(125.0, 18.0, 20.0, 34.0, 1e-9, 0.1).unwrap();
    let psi = trace.last().unwrap();
    assert!((psi - 0.6268).abs() < 5e-5);
    assert_eq!(trace.iterations(), 12);
    assert_eq!(trace.estimates().len(), trace.iterations());

    // Same inputs, same trace.
    let again = solve::<f64>(125.0, 18.0, 20.0, 34.0, 1e-9, 0.1).unwrap();
    assert_eq!(trace, again);
}

#[test]
fn default_configuration() {
    let trace = expectation_maximization::<f64>(&Counts::default(), &EmConfig::default()).unwrap();
    assert_eq!(trace.iterations(), 7);
    assert!((trace.last().unwrap() - 0.6268).abs() < 5e-5);
}

#[test]
fn zero_iterations() {
    let trace = solve::<f64>(125.0, 18.0, 20.0, 34.0, 1.0, 0.5).unwrap();
    assert!(trace.is_empty());
    assert_eq!(trace.iterations(), 0);
    assert_eq!(trace.last(), None);

    // The first test is made against zero: even degenerate data passes through untouched.
    let trace = solve::<f64>(0.0, 0.0, 0.0, 0.0, 1e-6, 1e-7).unwrap();
    assert_eq!(trace.iterations(), 0);
}

#[test]
fn degenerate_counts() {
    match solve::<f64>(0.0, 0.0, 0.0, 0.0, 1e-6, 0.5) {
        Err(EmError::DegenerateData { total, y11 }) => {
            assert_eq!(total, 0.0);
            assert_eq!(y11, 0.0);
        },
        other => panic!("Unexpected result: {:?}", other)
    }
}

#[test]
fn converged_estimate_is_fixed_point() {
    let tol = 1e-9;
    let trace = solve::<f64>(125.0, 18.0, 20.0, 34.0, tol, 0.1).unwrap();
    let psi = trace.last().unwrap();
    let again = solve::<f64>(125.0, 18.0, 20.0, 34.0, tol, psi).unwrap();
    assert!(again.iterations() <= 1);
}

#[test]
fn random_counts_invariants() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let y : Vec<f64> = (0..4).map(|_| rng.gen_range(1, 500) as f64 ).collect();
        let counts = Counts::new(y[0], y[1], y[2], y[3]);
        let start : f64 = rng.gen_range(0.05, 0.95);
        let tol = 1e-8;
        assert!((counts.total() - y.iter().sum::<f64>()).abs() < EPS);

        let trace = expectation_maximization::<f64>(&counts, &EmConfig::new(tol, start)).unwrap();
        assert_eq!(trace.estimates().len(), trace.iterations());
        assert!(trace.iterations() >= 1);

        let mut psi_used = start;
        for psi in trace.estimates() {
            let split = expectation_step(psi_used, counts.y1()).unwrap();
            assert!((split.y11 + split.y12 - counts.y1()).abs() < EPS);
            let next = maximization_step(&split, counts.y4(), counts.total()).unwrap();
            assert_eq!(next, *psi);
            assert!(*psi > 0. && *psi < 1.);
            psi_used = *psi;
        }
        assert_eq!(counts.total(), y[0] + y[1] + y[2] + y[3]);

        let last = trace.last().unwrap();
        let again = expectation_maximization::<f64>(&counts, &EmConfig::new(tol, last)).unwrap();
        assert!(again.iterations() <= 1);
    }
}

#[test]
fn estimator_interface() {
    let mut em = ExpectMax::<f64>::new(EmConfig::new(1e-9, 0.1));
    let n = em.fit(&Counts::default()).unwrap().iterations();
    assert_eq!(n, 12);
    assert_eq!(em.result().unwrap().iterations(), 12);
    let counts : Counts = "125,18,20,34".parse().unwrap();
    assert_eq!(em.fit(&counts).unwrap(), &solve::<f64>(125.0, 18.0, 20.0, 34.0, 1e-9, 0.1).unwrap());
}

#[test]
fn trace_csv_file() {
    let trace = solve::<f64>(125.0, 18.0, 20.0, 34.0, 1e-9, 0.1).unwrap();
    let path = temp_path("trace.csv");
    io::write_trace_csv(&trace, &path).unwrap();
    let back = io::read_trace_csv(&path).unwrap();
    assert_eq!(back.len(), trace.iterations());
    for (a, b) in back.iter().zip(trace.estimates()) {
        assert!((a - b).abs() < EPS);
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn config_and_counts_files() {
    let cfg_path = temp_path("config.json");
    std::fs::write(&cfg_path, r#"{ "tolerance" : 1e-9, "initial_guess" : 0.1 }"#).unwrap();
    let cfg : EmConfig = EmConfig::load_from_path(&cfg_path).unwrap();
    assert_eq!(cfg, EmConfig::new(1e-9, 0.1));

    let counts_path = temp_path("counts.json");
    Counts::<f64>::new(125.0, 18.0, 20.0, 34.0).save_to_path(&counts_path).unwrap();
    let counts : Counts = Counts::load_from_path(&counts_path).unwrap();
    assert_eq!(expectation_maximization::<f64>(&counts, &cfg).unwrap().iterations(), 12);

    let _ = std::fs::remove_file(&cfg_path);
    let _ = std::fs::remove_file(&counts_path);
}
