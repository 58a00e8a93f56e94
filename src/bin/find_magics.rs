//! Magic-number search tool.
//!
//! Runs the offline randomized search for every square of the chosen
//! slider(s) and prints the discovered constants as Rust source, ready to
//! paste over the embedded tables. This is a build-time tool; the engine
//! itself only ever reads the embedded results.
//!
//! Usage:
//!   cargo run --release --bin find_magics -- --piece both --threads 8
//!
//! A square the search gives up on is reported with a zero sentinel and
//! logged; rerun with a bigger budget, more time, or another seed.

use std::time::{Duration, Instant};

use chrono::Local;
use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use log::{info, warn};
use rayon::prelude::*;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rookery::magic::Slider;
use rookery::magic_search::{find_magic, validate_magic, SearchJob, SearchParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Piece {
    Rook,
    Bishop,
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "find_magics")]
#[command(about = "Search magic multipliers for the sliding-piece attack tables")]
struct Args {
    /// Which slider's tables to search
    #[arg(long, value_enum, default_value_t = Piece::Both)]
    piece: Piece,

    /// Worker threads racing per square
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Candidate budget per worker per square
    #[arg(long, default_value_t = 5_000_000)]
    attempts: u64,

    /// Wall-clock limit per square, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Base seed for the candidate generators
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,

    /// Shrink each table below its natural size by this many bits
    /// (harder; expect failures beyond 1)
    #[arg(long, default_value_t = 0)]
    tighten: u32,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let args = Args::parse();
    let params = SearchParams {
        threads: args.threads,
        attempts_per_worker: args.attempts,
        timeout: Duration::from_millis(args.timeout_ms),
        seed: args.seed,
    };

    let sliders: &[Slider] = match args.piece {
        Piece::Rook => &[Slider::Rook],
        Piece::Bishop => &[Slider::Bishop],
        Piece::Both => &[Slider::Rook, Slider::Bishop],
    };

    println!("// magic tables generated {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    for &slider in sliders {
        search_slider(slider, &params, args.tighten);
    }
    Ok(())
}

fn search_slider(slider: Slider, params: &SearchParams, tighten: u32) {
    info!("preparing 64 {slider:?} jobs");
    let jobs: Vec<SearchJob> = (0..64u32)
        .into_par_iter()
        .map(|square| SearchJob::prepare(square as u8, slider, tighten))
        .collect();

    let started = Instant::now();
    let mut magics = [0u64; 64];
    let mut shifts = [0u32; 64];
    let mut failures = 0usize;

    for job in &jobs {
        let square_start = Instant::now();
        let magic = find_magic(job, params);
        shifts[job.square as usize] = job.shift;
        if magic == 0 {
            warn!(
                "{:?} square {}: no magic within budget ({} subsets into {} slots)",
                slider,
                job.square,
                job.subset_count(),
                job.table_size(),
            );
            failures += 1;
            continue;
        }
        debug_assert!(validate_magic(job, magic));
        magics[job.square as usize] = magic;
        info!(
            "{:?} square {}: {:#018x} in {:?}",
            slider,
            job.square,
            magic,
            square_start.elapsed()
        );
    }

    info!(
        "{slider:?} search done in {:?}, {failures} square(s) unsolved",
        started.elapsed()
    );

    let name = match slider {
        Slider::Rook => "ROOK",
        Slider::Bishop => "BISHOP",
    };
    println!("pub const {name}_MAGICS: [u64; 64] = [");
    for row in magics.chunks(4) {
        let cells: Vec<String> = row.iter().map(|m| format!("{m:#018x},")).collect();
        println!("    {}", cells.join(" "));
    }
    println!("];");
    println!("pub const {name}_SHIFTS: [u32; 64] = [");
    for row in shifts.chunks(8) {
        let cells: Vec<String> = row.iter().map(|s| format!("{s},")).collect();
        println!("    {}", cells.join(" "));
    }
    println!("];");
}
