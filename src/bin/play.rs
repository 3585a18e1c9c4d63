use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use grid2048::players::{run_player, CornerPlayer, MaxScorePlayer, Player, PlayerRun, RandomPlayer, RunSummary};
use grid2048::{Game, Move};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "play", version, about = "Play 2048 in the terminal or pit the bot players against each other")]
struct Cli {
    /// Seed for the random source (defaults to OS entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Line-based game: type L, R, U or D and press enter; n restarts, q quits
    Interactive,
    /// Run every bot player for a number of games and print a summary table
    Players {
        /// Games per player
        #[arg(short = 't', long, default_value_t = 10)]
        trials: usize,
        /// Move cap per game
        #[arg(short = 'm', long, default_value_t = 1200)]
        max_iterations: usize,
        /// Show a progress bar while games run
        #[arg(long)]
        progress: bool,
    },
}

fn rng_for(seed: Option<u64>, offset: u64) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(offset)),
        None => StdRng::from_entropy(),
    }
}

fn status(game: &Game, iteration: usize) -> String {
    format!("{}\nIteration {}\nMax Value {}\n", game.grid(), iteration, game.max_value())
}

fn interactive(seed: Option<u64>) -> anyhow::Result<()> {
    let mut game = Game::new(rng_for(seed, 0));
    let mut iteration = 0;
    let mut over = false;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "{}", status(&game, iteration))?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line.context("reading input")?;
        let key = line.trim();
        match key {
            "" => continue,
            "q" | "Q" => break,
            "n" | "N" => {
                game.reset();
                iteration = 0;
                over = false;
            }
            _ if over => writeln!(stdout, "Game over. Press 'n' to restart or 'q' to quit")?,
            _ => match key.parse::<Move>() {
                Ok(dir) => {
                    iteration += 1;
                    game.slide(dir);
                    if !game.add_tile() {
                        over = true;
                        info!("game over after {iteration} moves, max value {}", game.max_value());
                        writeln!(stdout, "FAILURE... Press 'n' to restart or 'q' to quit")?;
                    }
                }
                Err(e) => writeln!(stdout, "INVALID KEY {key:?}: {e}")?,
            },
        }
        write!(stdout, "{}", status(&game, iteration))?;
        stdout.flush()?;
    }
    Ok(())
}

fn run_trials<P>(player: P, trials: usize, max_iterations: usize, seed: Option<u64>, pb: &ProgressBar) -> Vec<PlayerRun>
where
    P: Player<StdRng> + Copy + Send + Sync,
{
    (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut player = player;
            let mut game = Game::new(rng_for(seed, trial as u64));
            let run = run_player(&mut player, &mut game, max_iterations);
            pb.inc(1);
            run
        })
        .collect()
}

fn players(trials: usize, max_iterations: usize, progress: bool, seed: Option<u64>) -> anyhow::Result<()> {
    let pb = if progress {
        let pb = ProgressBar::new((trials * 3) as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")
                .context("progress template")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let summaries = [
        RunSummary::from_runs("random", &run_trials(RandomPlayer, trials, max_iterations, seed, &pb)),
        RunSummary::from_runs("max_score", &run_trials(MaxScorePlayer, trials, max_iterations, seed, &pb)),
        RunSummary::from_runs("corner", &run_trials(CornerPlayer, trials, max_iterations, seed, &pb)),
    ];
    pb.finish_and_clear();

    let rule = "-".repeat(80);
    println!("{rule}");
    println!("{:<20} {:<10} {:<10} {:<10}", "name", "iter", "raw", "value");
    println!("{rule}");
    for s in &summaries {
        println!("{:<20}", s.name);
        println!("    {:<20} {:<10.2} {:<10.2} {:<10.2}", "mean", s.mean_iterations, s.mean_max_value, s.mean_tile);
        println!(
            "    {:<20} {:<10.2} {:<10.2} {:<10.2}",
            "max", s.max_iterations as f64, s.max_max_value as f64, s.max_tile as f64
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Interactive => interactive(cli.seed),
        Command::Players { trials, max_iterations, progress } => {
            info!("running {trials} games per player, at most {max_iterations} moves each");
            players(trials, max_iterations, progress, cli.seed)
        }
    }
}
