use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context};
use arbiter::chess::board::Board;
use arbiter::game::Game;
use clap::Parser;
use rayon::prelude::*;

/// Prints games archived by the referee (`<data dir>/archive/*.json.gz`).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Archived games to print.
    #[arg(required = true)]
    archives: Vec<PathBuf>,
    /// Print the board after every move, not only the notation.
    #[arg(long, default_value_t = false)]
    frames: bool,
}

fn frame(game: &Game, ply: usize, board: &Board) -> String {
    match ply.checked_sub(1).and_then(|index| game.moves().get(index)) {
        Some(last) => format!("{ply}. {last}\n{board:?}"),
        None => format!("Start\n{board:?}"),
    }
}

fn print_game(game: &Game, frames: bool) {
    println!(
        "{} ({}) vs {} ({})",
        game.white().id,
        game.white().color,
        game.black().id,
        game.black().color
    );
    match game.winner() {
        Some(winner) => println!("{winner} won after {} moves", game.moves().len()),
        None => println!("Undecided after {} moves", game.moves().len()),
    }
    println!("{}", game.notation());
    if frames {
        // Frames are independent: render them in parallel, print in order.
        let rendered: Vec<String> = game
            .positions()
            .par_iter()
            .enumerate()
            .map(|(ply, board)| frame(game, ply, board))
            .collect();
        for frame in rendered {
            println!("\n{frame}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    for path in &args.archives {
        if !path.is_file() {
            bail!("{} is not a file", path.display());
        }
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let game = arbiter::store::decompress(file)
            .with_context(|| format!("reading {}", path.display()))?;
        println!("== {}", path.display());
        print_game(&game, args.frames);
    }
    Ok(())
}
