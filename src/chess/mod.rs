//! Implementation of the chess rules a match is refereed with: the board, the
//! way pieces move, checks and the notation used to print the game.

pub mod board;
pub mod check;
pub mod core;
pub mod notation;
pub mod rules;
