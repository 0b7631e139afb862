#![no_main]
use arbiter::chess::board::Board;
use arbiter::chess::check;
use arbiter::chess::core::Side;
use arbiter::game::{Game, Verdict};
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

// Every byte picks one of the legal moves of the side to move.
fuzz_target!(|data: &[u8]| {
    let mut game = Game::new("white", "black", "fuzz");
    for &choice in data {
        let legal = check::legal_moves(game.board(), game.turn());
        if legal.is_empty() {
            break;
        }
        let next_move = legal[usize::from(choice) % legal.len()];
        let actor = match game.turn() {
            Side::White => "white",
            Side::Black => "black",
        };
        let mover = game.turn();
        let verdict = game.play(actor, next_move).expect("legal moves are accepted");
        assert_eq!(*game.board(), Board::replay(game.moves()));
        assert_eq!(
            verdict == Verdict::Checkmate { winner: mover },
            check::is_checkmate(game.board(), game.turn())
        );
        if game.winner().is_some() {
            break;
        }
    }
});
