//! Referee for two-player chess matches. It keeps the games, checks every move
//! against the rules of chess (including checks and checkmates), prints the
//! history in algebraic notation and archives finished games.
//!
//! The rules live in [`chess`], a single match in [`game`], storage in
//! [`store`] and the line-oriented front-end in [`Engine`].
//!
//! Castling and en passant are not part of the rules.

pub mod chess;
pub mod config;
pub mod error;
pub mod game;
pub mod store;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Target triple and build profile. Produced by `build.rs`.
const TARGET: &str = include_str!(concat!(env!("OUT_DIR"), "/target"));

/// Returns the full version that can be used to identify how the binary was
/// built in the first place.
#[must_use]
pub fn version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the version, the build type and whether the
/// build is clean on startup. Goes to stderr: stdout carries the replies.
pub fn print_binary_info() {
    eprintln!("Arbiter {}", version());
    eprintln!("Release build: {}", !shadow_rs::is_debug());
    eprintln!("Target: {TARGET}");
    if !shadow_rs::git_clean() {
        eprintln!("Warning: built with uncommitted changes");
    }
}
