//! LLL Lattice Reduction Benchmark
//!
//! Times exact-rational LLL against the f64 instantiation on random lattices.

use lcg_lattice_core::lattice::basis;
use lcg_lattice_core::{Lll, LllConfig, Rational};
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Results from a single LLL benchmark run
#[derive(Debug, Clone)]
pub struct LllBenchResult {
    pub n: usize,
    pub bits: usize,
    pub exact_ms: f64,
    pub float_ms: f64,
    pub exact_swaps: usize,
    pub float_swaps: usize,
    pub exact_iterations: usize,
    pub gs_share: f64,
    pub verified: bool,
}

/// Run the benchmark table for every (n, bits) up to the given limits
pub fn run_lll_benchmark(
    max_dim: usize,
    max_bits: usize,
    export: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                LLL Lattice Reduction Benchmark               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Max dimension: {}, Max bits: {}", max_dim, max_bits);
    println!();

    let configs: Vec<(usize, usize)> = vec![
        (4, 8),
        (6, 8),
        (8, 8),
        (8, 12),
        (10, 12),
        (12, 16),
        (15, 16),
        (20, 16),
        (20, 20),
        (25, 20),
    ]
    .into_iter()
    .filter(|&(n, b)| n <= max_dim && b <= max_bits)
    .collect();

    let mut results = Vec::new();

    println!("┌──────┬──────┬────────────┬────────────┬────────────┬────────────┬──────────┬──────────┐");
    println!("│  n   │ bits │ Exact (ms) │  f64 (ms)  │ Exact swaps│  f64 swaps │ GS share │ Verified │");
    println!("├──────┼──────┼────────────┼────────────┼────────────┼────────────┼──────────┼──────────┤");

    for &(n, bits) in &configs {
        let result = benchmark_lll(n, bits)?;

        println!(
            "│ {:>4} │ {:>4} │ {:>10.2} │ {:>10.2} │ {:>10} │ {:>10} │ {:>7.1}% │    {}     │",
            n,
            bits,
            result.exact_ms,
            result.float_ms,
            result.exact_swaps,
            result.float_swaps,
            result.gs_share * 100.0,
            if result.verified { "✓" } else { "✗" }
        );

        results.push(result);
    }

    println!("└──────┴──────┴────────────┴────────────┴────────────┴────────────┴──────────┴──────────┘");
    println!();

    if let Some(result) = results.last() {
        println!("Summary for n={}, bits={}:", result.n, result.bits);
        println!(
            "  Exact LLL:    {:>10.2} ms ({} swaps, {} iterations)",
            result.exact_ms, result.exact_swaps, result.exact_iterations
        );
        println!(
            "  f64 LLL:      {:>10.2} ms ({} swaps)",
            result.float_ms, result.float_swaps
        );
        println!();
    }

    if let Some(path) = export {
        export_lll_results(path, &results)?;
        println!("Results exported to: {}", path.display());
    }

    Ok(())
}

fn benchmark_lll(n: usize, bits: usize) -> Result<LllBenchResult, Box<dyn Error>> {
    let lattice = basis::random(n, n, bits);

    let exact_start = Instant::now();
    let config = LllConfig::<Rational>::default();
    let exact = Lll::reduce(&lattice, &config)?;
    let exact_ms = exact_start.elapsed().as_secs_f64() * 1000.0;

    let approx = lattice.map(Rational::to_f64);
    let float_start = Instant::now();
    let float_config = LllConfig::<f64> {
        max_iterations: Some(100_000),
        ..LllConfig::default()
    };
    let float = Lll::reduce(&approx, &float_config)?;
    let float_ms = float_start.elapsed().as_secs_f64() * 1000.0;

    let verified = Lll::is_reduced(&exact.basis, &config.delta)?;
    let gs_share = if exact.stats.total_time > 0.0 {
        exact.stats.gs_time / exact.stats.total_time
    } else {
        0.0
    };

    Ok(LllBenchResult {
        n,
        bits,
        exact_ms,
        float_ms,
        exact_swaps: exact.stats.swaps,
        float_swaps: float.stats.swaps,
        exact_iterations: exact.stats.iterations,
        gs_share,
        verified,
    })
}

/// Export LLL benchmark results to CSV
fn export_lll_results(path: &Path, results: &[LllBenchResult]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "n,bits,exact_ms,float_ms,exact_swaps,float_swaps,exact_iterations,gs_share,verified"
    )?;

    for r in results {
        writeln!(
            file,
            "{},{},{:.6},{:.6},{},{},{},{:.6},{}",
            r.n,
            r.bits,
            r.exact_ms,
            r.float_ms,
            r.exact_swaps,
            r.float_swaps,
            r.exact_iterations,
            r.gs_share,
            r.verified
        )?;
    }

    Ok(())
}
