//! [Standard Algebraic Notation] for the moves of a game.
//!
//! Castling and en passant are never produced: neither exists in the rules
//! these moves are validated against.
//!
//! [Standard Algebraic Notation]: https://en.wikipedia.org/wiki/Algebraic_notation_(chess)

use crate::chess::board::Board;
use crate::chess::check;
use crate::chess::core::{Move, PieceKind};

/// Number of moves printed on a single line of [`format_history`].
const MOVES_PER_LINE: usize = 3;

bitflags::bitflags! {
    /// Which part of the origin square has to be spelled out to tell apart
    /// several pieces of the same kind that can legally reach the same
    /// destination.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Disambiguation: u8 {
        #[allow(missing_docs)]
        const FILE = 0b01;
        #[allow(missing_docs)]
        const RANK = 0b10;
    }
}

impl Disambiguation {
    /// Picks the shortest disambiguation between `next_move` and the other
    /// pieces of the same side and kind that could legally move to the same
    /// square: the file if it differs from all of them, otherwise the rank,
    /// otherwise both.
    ///
    /// Rivals are found with [`check::is_legal`], not with the bare movement
    /// rules: a pinned piece of the same kind can't make the move, so it
    /// does not make the notation ambiguous.
    #[must_use]
    pub fn new(board: &Board, next_move: &Move) -> Self {
        let Some(piece) = board.at(next_move.from) else {
            return Self::empty();
        };
        let mut rivals = board
            .pieces(piece.side)
            .filter(|&(square, other)| square != next_move.from && other.kind == piece.kind)
            .filter(|&(square, _)| {
                check::is_legal(board, &Move::new(square, next_move.to, None))
            })
            .map(|(square, _)| square)
            .peekable();
        if rivals.peek().is_none() {
            return Self::empty();
        }
        let (mut same_file, mut same_rank) = (false, false);
        for rival in rivals {
            same_file |= rival.file() == next_move.from.file();
            same_rank |= rival.rank() == next_move.from.rank();
        }
        match (same_file, same_rank) {
            (false, _) => Self::FILE,
            (true, false) => Self::RANK,
            (true, true) => Self::FILE | Self::RANK,
        }
    }
}

/// Formats a single move in SAN given the position right before it.
///
/// The move is expected to be legal; a move from an empty square is printed
/// in UCI form instead.
#[must_use]
pub fn san(board: &Board, next_move: &Move) -> String {
    let Some(piece) = board.at(next_move.from) else {
        return next_move.to_string();
    };
    let is_capture = board.at(next_move.to).is_some();
    let mut result = String::new();
    match piece.kind.san_symbol() {
        // Pawn captures are identified by the file the pawn came from.
        None => {
            if is_capture {
                result.push_str(&next_move.from.file().to_string());
            }
        },
        Some(symbol) => {
            result.push(symbol);
            let disambiguation = Disambiguation::new(board, next_move);
            if disambiguation.contains(Disambiguation::FILE) {
                result.push_str(&next_move.from.file().to_string());
            }
            if disambiguation.contains(Disambiguation::RANK) {
                result.push_str(&next_move.from.rank().to_string());
            }
        },
    }
    if is_capture {
        result.push('x');
    }
    result.push_str(&next_move.to.to_string());
    if let Some(promotion) = next_move.promotion {
        if let Some(symbol) = PieceKind::from(promotion).san_symbol() {
            result.push('=');
            result.push(symbol);
        }
    }
    let mut after = *board;
    after.apply(next_move);
    let opponent = piece.side.opponent();
    if check::is_checkmate(&after, opponent) {
        result.push('#');
    } else if check::in_check(&after, opponent) {
        result.push('+');
    }
    result
}

/// Replays `moves` from the starting position and formats all of them,
/// space-separated, starting a new line after every third move.
#[must_use]
pub fn format_history(moves: &[Move]) -> String {
    let mut board = Board::starting();
    let mut result = String::new();
    for (index, next_move) in moves.iter().enumerate() {
        if index > 0 {
            result.push(if index % MOVES_PER_LINE == 0 { '\n' } else { ' ' });
        }
        result.push_str(&san(&board, next_move));
        board.apply(next_move);
    }
    result
}
