use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};
use ttt::{Board, MonteCarlo, MonteCarloConfig, Player};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board dimension (default: 3)
    #[arg(long, default_value_t = 3)]
    dim: usize,

    /// Play under the reverse rule
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    reverse: bool,

    /// Rollouts per move selection (default: 100,000)
    #[arg(long, default_value_t = 100_000)]
    trials: u32,

    /// Comma-separated thread counts to compare (default: 1 and all cores)
    #[arg(long, value_delimiter = ',')]
    threads: Vec<usize>,

    /// Move selections timed per thread count (default: 5)
    #[arg(long, default_value_t = 5)]
    rounds: u32,

    /// Seed for the random number generator
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ttt::init_logging("warn");
    ensure!(args.dim >= 1, "board dimension must be at least 1");
    ensure!(args.rounds >= 1, "at least one round is needed");

    let threads = if args.threads.is_empty() {
        vec![1, num_cpus::get()]
    } else {
        args.threads.clone()
    };

    println!("Monte Carlo Tic-Tac-Toe - Benchmark Tool");
    println!("========================================");
    println!(
        "Board: {dim}x{dim}{}",
        if args.reverse { " (reverse)" } else { "" },
        dim = args.dim
    );
    println!("Trials per move: {}", args.trials);
    println!("Rounds: {}", args.rounds);
    println!("----------------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let board = Board::new(args.dim, args.reverse);
    for (index, count) in threads.into_iter().enumerate() {
        let config = MonteCarloConfig {
            trials: args.trials,
            threads: count,
            ..MonteCarloConfig::default()
        };
        let engine = MonteCarlo::new(config).with_context(|| format!("failed to build engine with {count} threads"))?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
        if index == 0 {
            let config = engine.config();
            println!(
                "Weights: searcher {}, opponent {}",
                config.win_increment, config.loss_decrement
            );
            println!("----------------------------------------");
        }

        let start = Instant::now();
        let mut last = (0, 0);
        for _ in 0..args.rounds {
            last = engine.select_move(&board, Player::X, &mut rng);
        }
        let duration = start.elapsed();

        print_stats(engine.threads(), u64::from(args.trials) * u64::from(args.rounds), duration, last);
    }
    Ok(())
}

fn print_stats(threads: usize, rollouts: u64, duration: Duration, last: (usize, usize)) {
    let secs = duration.as_secs_f64();
    println!("{threads} thread(s):");
    println!("  Rollouts: {rollouts}");
    println!("  Time: {secs:.3}s");
    println!("  Rollouts/sec: {:.0}", rollouts as f64 / secs);
    println!("  Last choice: {},{}", last.0, last.1);
}
