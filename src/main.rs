//! # Terminal Tic-Tac-Toe
//!
//! Plays N×N tic-tac-toe, optionally with the reverse rule, against the
//! Monte Carlo AI. The session mirrors a simple GUI: type a square to play
//! it, and once a game is over use `new`, `switch` or `reverse` the way the
//! buttons would be used.
//!
//! ## Usage
//! Run with `cargo run --release -- --help` for the options.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use colored::Colorize;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::{self, BufRead, Write};
use tracing::info;
use ttt::board::ROW_SEPARATOR;
use ttt::{parse_square, Board, Cell, GameController, MonteCarlo, MonteCarloConfig, MoveResult, ParseError, Player};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board dimension (N for an NxN board)
    #[clap(short, long, default_value_t = 3)]
    dim: usize,

    /// Start with the reverse rule: completing a line loses
    #[clap(short, long, action = clap::ArgAction::SetTrue)]
    reverse: bool,

    /// Marker played by the human. X always moves first
    #[clap(short = 'p', long, default_value = "O")]
    human: Player,

    /// Monte Carlo rollouts per computer move
    #[clap(short, long, default_value_t = 2500)]
    trials: u32,

    /// Rollout threads, 0 for one per CPU core
    #[clap(short, long, default_value_t = 0)]
    num_threads: usize,

    /// Score added to the winner's squares after each rollout
    #[clap(long, default_value_t = 1.0)]
    win_increment: f64,

    /// Score removed from the loser's squares after each rollout
    #[clap(long, default_value_t = 1.0)]
    loss_decrement: f64,

    /// Seed for the AI's random number generator
    #[clap(short, long)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

/// A line of user input.
#[derive(Debug, PartialEq)]
enum Command {
    Move(usize, usize),
    NewGame,
    Switch,
    Reverse,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, ParseError> {
    Ok(match line.trim().to_ascii_lowercase().as_str() {
        "new" | "n" => Command::NewGame,
        "switch" | "s" => Command::Switch,
        "reverse" | "r" => Command::Reverse,
        "board" | "b" => Command::Show,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        square => {
            let (row, col) = parse_square(square)?;
            Command::Move(row, col)
        }
    })
}

fn colored_cell(cell: Cell) -> String {
    match cell {
        Cell::X => "X".blue().bold().to_string(),
        Cell::O => "O".red().bold().to_string(),
        Cell::Empty => " ".to_string(),
    }
}

/// Same layout as `Board`'s `Display`, with coloured markers and row/column
/// labels.
fn render(board: &Board) {
    let dim = board.dim();
    let header: Vec<String> = (0..dim).map(|col| col.to_string()).collect();
    println!("   {}", header.join("   "));
    for row in 0..dim {
        if row > 0 {
            println!("  {ROW_SEPARATOR}");
        }
        let cells: Vec<String> = (0..dim).map(|col| colored_cell(board.get_square(row, col))).collect();
        println!("{row} {}", cells.join(" | "));
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  <row> <col>   play a square (also <row>,<col>)");
    println!("  new           start the next game (after a game ends)");
    println!("  switch        swap markers with the computer (after a game ends)");
    println!("  reverse       toggle the reverse rule for the next game (after a game ends)");
    println!("  board         show the board");
    println!("  help          show this message");
    println!("  quit          leave");
}

fn report(controller: &GameController, result: MoveResult) {
    match result {
        MoveResult::Played { square, player, outcome } => {
            println!("{player} plays {},{}", square.0, square.1);
            render(controller.board());
            if let Some(outcome) = outcome {
                println!("{}", outcome.to_string().bold());
                match outcome.winner() {
                    Some(winner) if winner == controller.human() => println!("You win!"),
                    Some(_) => println!("The computer wins."),
                    None => {}
                }
                println!("Type `new` to play again.");
            }
        }
        MoveResult::Occupied => println!("That square is taken."),
        MoveResult::NotYourTurn => println!("Wait for the computer to move."),
        MoveResult::GameOver => println!("The game is over. Type `new` to play again."),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    ttt::init_logging(&args.log_level);
    ensure!(args.dim >= 1, "board dimension must be at least 1");

    let config = MonteCarloConfig {
        trials: args.trials,
        win_increment: args.win_increment,
        loss_decrement: args.loss_decrement,
        threads: args.num_threads,
    };
    let engine = MonteCarlo::new(config).context("failed to set up the Monte Carlo engine")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    info!(seed, threads = engine.threads(), "engine ready");

    let mut controller = GameController::new(args.dim, args.reverse, args.human);
    println!(
        "You play {} on a {dim}x{dim} board{}. Type `help` for commands.",
        controller.human(),
        if args.reverse { " (reverse rules)" } else { "" },
        dim = args.dim,
    );
    render(controller.board());

    let mut lines = io::stdin().lock().lines();
    loop {
        while !controller.is_game_over() && !controller.is_human_turn() {
            let result = controller.computer_move(&engine, &mut rng);
            report(&controller, result);
        }

        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match command {
            Command::Move(row, col) => match controller.human_move(row, col) {
                Ok(result) => report(&controller, result),
                Err(e) => println!("{e}"),
            },
            Command::NewGame => match controller.new_game() {
                Ok(()) => {
                    println!(
                        "New game: you play {}{}.",
                        controller.human(),
                        if controller.board().is_reverse() { " (reverse rules)" } else { "" }
                    );
                    render(controller.board());
                }
                Err(e) => println!("{e}"),
            },
            Command::Switch => match controller.switch_sides() {
                Ok(human) => println!("You will play {human} next game."),
                Err(e) => println!("{e}"),
            },
            Command::Reverse => match controller.toggle_reverse() {
                Ok(true) => println!("Reverse rules next game: completing a line loses."),
                Ok(false) => println!("Normal rules next game."),
                Err(e) => println!("{e}"),
            },
            Command::Show => render(controller.board()),
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }
    Ok(())
}
