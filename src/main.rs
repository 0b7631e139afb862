//! Referee process: reads commands from stdin and writes replies to stdout.

use std::io;

use anyhow::Context;
use arbiter::config::Config;
use arbiter::store::{DirStore, GameStore, MemoryStore};
use arbiter::Engine;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout is reserved for the replies.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    arbiter::print_binary_info();

    let config = Config::from_env().context("reading configuration")?;
    let mut store: Box<dyn GameStore> = match &config.data_dir {
        Some(dir) => Box::new(DirStore::open(dir, config.game_ttl)?),
        None => Box::new(MemoryStore::new(config.game_ttl)),
    };
    tracing::info!(group = %config.group, data_dir = ?config.data_dir, "serving");

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    Engine::new(&config, store.as_mut(), &mut input, &mut output).serve()
}
