#![no_main]
use arbiter::chess::board::Board;
use arbiter::chess::core::Move;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let _ = Move::from_uci(input);
    if let Ok(board) = Board::from_placement(input) {
        let printed = board.to_string();
        assert_eq!(Board::from_placement(&printed).ok(), Some(board));
    }
});
