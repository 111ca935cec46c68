//! LCG Lattice CLI
//!
//! Lattice reduction and LCG seed reversal from the command line.
//!
//! # Usage
//! ```bash
//! # LLL-reduce a basis given as rows
//! lcg-lattice reduce --rows "1,103,107;0,200,0;0,0,200"
//!
//! # Recover java.util.Random states from three nextInt(65536) outputs
//! lcg-lattice reverse --observe 39487:16:0 --observe 7175:16:0 --observe 57941:16:0
//!
//! # Timing table for exact vs f64 LLL
//! lcg-lattice lll-bench --max-dim 12 --export lll.csv
//! ```

mod lll_bench;

use clap::{Parser, Subcommand};
use lcg_lattice_core::lattice::{Bkz, BkzConfig, Lll, LllConfig};
use lcg_lattice_core::{
    CallConstraint, Lcg, Matrix, Rational, ReverseConfig, SeedReverser, Vector,
};
use num_bigint::BigInt;
use rayon::iter::ParallelIterator;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "lcg-lattice")]
#[command(about = "Exact lattice reduction and LCG seed recovery")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce a lattice basis with LLL, or BKZ when a block size is given
    Reduce {
        /// Basis rows separated by ';', entries by ','
        #[arg(long)]
        rows: String,

        /// Lovász parameter in (1/4, 1], as "p/q" or a decimal
        #[arg(long, default_value = "0.99", value_parser = parse_rational)]
        delta: Rational,

        /// BKZ block size
        #[arg(long)]
        block_size: Option<usize>,
    },

    /// Enumerate seeds consistent with observed LCG states
    Reverse {
        /// Multiplier (default: java.util.Random)
        #[arg(long, value_parser = parse_bigint)]
        multiplier: Option<BigInt>,

        /// Increment (default: java.util.Random)
        #[arg(long, value_parser = parse_bigint)]
        increment: Option<BigInt>,

        /// Modulus (default: 2^48)
        #[arg(long, value_parser = parse_bigint)]
        modulus: Option<BigInt>,

        /// Observed state range MIN:MAX:GAP, in call order
        #[arg(long = "call", value_parser = parse_call)]
        calls: Vec<CallConstraint>,

        /// Observed top bits VALUE:BITS:GAP, in call order
        #[arg(long = "observe", conflicts_with = "calls")]
        observations: Vec<String>,

        /// Stop after this many seeds
        #[arg(long)]
        limit: Option<usize>,

        /// Enumerate on all cores
        #[arg(long)]
        parallel: bool,

        /// Lovász parameter for the reduction
        #[arg(long, default_value = "0.99", value_parser = parse_rational)]
        delta: Rational,

        /// Reduce with BKZ of this block size
        #[arg(long)]
        block_size: Option<usize>,
    },

    /// Benchmark exact vs f64 LLL on random lattices
    LllBench {
        /// Maximum lattice dimension
        #[arg(long, default_value = "20")]
        max_dim: usize,

        /// Maximum entry bit size
        #[arg(long, default_value = "16")]
        max_bits: usize,

        /// Export results to CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let outcome = match cli.command {
        Commands::Reduce {
            rows,
            delta,
            block_size,
        } => run_reduce(&rows, delta, block_size),
        Commands::Reverse {
            multiplier,
            increment,
            modulus,
            calls,
            observations,
            limit,
            parallel,
            delta,
            block_size,
        } => {
            let java = Lcg::java();
            Lcg::new(
                multiplier.unwrap_or(java.multiplier),
                increment.unwrap_or(java.increment),
                modulus.unwrap_or(java.modulus),
            )
            .map_err(Box::<dyn Error>::from)
            .and_then(|lcg| {
                let calls = if observations.is_empty() {
                    calls
                } else {
                    parse_observations(&observations, &lcg)?
                };
                let config = ReverseConfig {
                    dimension: calls.len(),
                    delta,
                    block_size,
                };
                run_reverse(&lcg, &calls, &config, limit, parallel)
            })
        }
        Commands::LllBench {
            max_dim,
            max_bits,
            export,
        } => lll_bench::run_lll_benchmark(max_dim, max_bits, export.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run_reduce(
    rows: &str,
    delta: Rational,
    block_size: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let basis = parse_rows(rows)?;
    println!("Input basis ({}×{}):", basis.rows(), basis.cols());
    println!("{}", basis);

    let start = Instant::now();
    let (reduced, transform) = match block_size {
        Some(beta) => {
            let config = BkzConfig::new(beta, delta.clone()).with_transform();
            let result = Bkz::reduce(&basis, &config)?;
            println!(
                "BKZ-{}: {} tours, {} insertions, {} LLL swaps",
                beta, result.stats.tours, result.stats.insertions, result.stats.lll.swaps
            );
            (result.basis, result.transform)
        }
        None => {
            let result = Lll::reduce(&basis, &LllConfig::new(delta.clone()).with_transform())?;
            println!(
                "LLL: {} iterations, {} swaps, {} size reductions",
                result.stats.iterations, result.stats.swaps, result.stats.size_reductions
            );
            (result.basis, result.transform)
        }
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!();
    println!("Reduced basis (δ = {}):", delta);
    println!("{}", reduced);
    if let Some(t) = transform {
        println!("Transform:");
        println!("{}", t);
    }
    println!("Time: {:.2} ms", elapsed_ms);

    Ok(())
}

fn run_reverse(
    lcg: &Lcg,
    calls: &[CallConstraint],
    config: &ReverseConfig,
    limit: Option<usize>,
    parallel: bool,
) -> Result<(), Box<dyn Error>> {
    println!("Generator: {}", lcg);
    for (i, call) in calls.iter().enumerate() {
        println!("  call {}: {}", i, call);
    }

    let start = Instant::now();
    let reverser = SeedReverser::new(lcg, calls, config)?;
    log::info!("Reduced basis:\n{}", reverser.reduced_basis());
    let candidates = reverser.candidates()?;

    let seeds: Vec<i64> = if parallel {
        let mut all: Vec<i64> = match limit {
            Some(k) => candidates.par_seeds().take_any(k).collect(),
            None => candidates.par_seeds().collect(),
        };
        all.sort_unstable();
        all
    } else {
        let mut candidates = candidates;
        let seeds = match limit {
            Some(k) => candidates.by_ref().take(k).collect(),
            None => candidates.by_ref().collect(),
        };
        if let Some(e) = candidates.take_error() {
            return Err(e.into());
        }
        seeds
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    for seed in &seeds {
        println!("{:#014x}  {}", seed, seed);
    }
    println!();
    println!("{} candidate seed(s) in {:.2} ms", seeds.len(), elapsed_ms);

    Ok(())
}

fn parse_rational(s: &str) -> Result<Rational, String> {
    s.parse::<Rational>().map_err(|e| e.to_string())
}

fn parse_bigint(s: &str) -> Result<BigInt, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
        None => BigInt::parse_bytes(s.as_bytes(), 10),
    };
    parsed.ok_or_else(|| format!("not an integer: {}", s))
}

fn parse_call(s: &str) -> Result<CallConstraint, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [min, max, rest @ ..] = parts.as_slice() else {
        return Err(format!("expected MIN:MAX:GAP, got {}", s));
    };
    let gap = match rest {
        [] => 0,
        [gap] => gap.parse().map_err(|_| format!("bad gap in {}", s))?,
        _ => return Err(format!("expected MIN:MAX:GAP, got {}", s)),
    };
    Ok(CallConstraint::new(
        min.parse().map_err(|_| format!("bad min in {}", s))?,
        max.parse().map_err(|_| format!("bad max in {}", s))?,
        gap,
    ))
}

fn parse_observations(specs: &[String], lcg: &Lcg) -> Result<Vec<CallConstraint>, Box<dyn Error>> {
    let state_bits = u32::try_from(lcg.state_bits())?;
    specs
        .iter()
        .map(|spec| -> Result<CallConstraint, Box<dyn Error>> {
            let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
            let (value, bits, gap) = match parts.as_slice() {
                [value, bits] => (value, bits, "0"),
                [value, bits, gap] => (value, bits, *gap),
                _ => return Err(format!("expected VALUE:BITS:GAP, got {}", spec).into()),
            };
            let call = CallConstraint::top_bits(
                value.parse()?,
                bits.parse()?,
                state_bits,
                gap.parse()?,
            )?;
            Ok(call)
        })
        .collect()
}

fn parse_rows(s: &str) -> Result<Matrix<Rational>, Box<dyn Error>> {
    let rows = s
        .split(';')
        .filter(|row| !row.trim().is_empty())
        .map(|row| {
            row.split(',')
                .map(|x| x.trim().parse::<Rational>())
                .collect::<Result<Vec<_>, _>>()
                .map(Vector::new)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Matrix::new(rows)?)
}
