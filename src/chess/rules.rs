//! Movement rules: whether a move has the right geometry for the piece that
//! makes it and whether its path is free.
//!
//! These rules know nothing about checks or turn order. A move passing
//! [`is_valid_shape`] may still leave the mover's king attacked: that is
//! decided by [`crate::chess::check`].

use crate::chess::board::Board;
use crate::chess::core::{Move, Piece, PieceKind, Square};

/// Upper bound on the number of steps [`path_is_clear`] takes. A valid ray is
/// never longer than 7 squares; the cap only protects from looping forever on
/// malformed input.
const MAX_RAY_STEPS: usize = 256;

/// Row and column distance between two squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Delta {
    rows: i8,
    cols: i8,
}

impl Delta {
    const fn new(from: Square, to: Square) -> Self {
        // Both coordinates are within 0..8, the difference always fits.
        Self {
            rows: to.row() as i8 - from.row() as i8,
            cols: to.col() as i8 - from.col() as i8,
        }
    }

    const fn is_straight(self) -> bool {
        (self.rows == 0) != (self.cols == 0)
    }

    const fn is_diagonal(self) -> bool {
        self.rows != 0 && self.rows.abs() == self.cols.abs()
    }
}

/// Decides whether the piece on `from` can reach `to` according to its
/// movement pattern. Moves from an empty square and moves onto a square
/// occupied by a piece of the same side are always rejected.
#[must_use]
pub fn is_valid_shape(board: &Board, next_move: &Move) -> bool {
    let Some(piece) = board.at(next_move.from) else {
        return false;
    };
    if let Some(target) = board.at(next_move.to) {
        if target.side == piece.side {
            return false;
        }
    }
    let (from, to) = (next_move.from, next_move.to);
    match piece.kind {
        PieceKind::Pawn => pawn(board, piece, from, to),
        PieceKind::Knight => knight(from, to),
        PieceKind::Bishop => bishop(board, from, to),
        PieceKind::Rook => rook(board, from, to),
        PieceKind::Queen => queen(board, from, to),
        PieceKind::King => king(from, to),
    }
}

/// Pawns push forward by one square (or two from their starting row) onto
/// empty squares and capture one square diagonally forward. There is no en
/// passant.
fn pawn(board: &Board, pawn: Piece, from: Square, to: Square) -> bool {
    let delta = Delta::new(from, to);
    let direction = pawn.side.pawn_direction();
    match (delta.rows, delta.cols.abs()) {
        (rows, 0) if rows == direction => board.at(to).is_none(),
        (rows, 0) if rows == 2 * direction && from.row() == pawn.side.pawns_starting_row() => {
            board.at(to).is_none() && path_is_clear(board, from, to)
        },
        (rows, 1) if rows == direction => board
            .at(to)
            .is_some_and(|target| target.side != pawn.side),
        _ => false,
    }
}

fn knight(from: Square, to: Square) -> bool {
    let delta = Delta::new(from, to);
    matches!((delta.rows.abs(), delta.cols.abs()), (1, 2) | (2, 1))
}

fn bishop(board: &Board, from: Square, to: Square) -> bool {
    Delta::new(from, to).is_diagonal() && path_is_clear(board, from, to)
}

fn rook(board: &Board, from: Square, to: Square) -> bool {
    Delta::new(from, to).is_straight() && path_is_clear(board, from, to)
}

fn queen(board: &Board, from: Square, to: Square) -> bool {
    rook(board, from, to) || bishop(board, from, to)
}

fn king(from: Square, to: Square) -> bool {
    let delta = Delta::new(from, to);
    delta.rows.abs() <= 1 && delta.cols.abs() <= 1
}

/// Walks from `from` towards `to` one square at a time and checks that every
/// square strictly between them is empty. The endpoints are not inspected.
///
/// The walk is only meaningful for straight and diagonal rays; for any other
/// delta it falls off the board (or hits the step cap) and reports a blocked
/// path.
#[must_use]
pub fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    if from == to {
        return true;
    }
    let delta = Delta::new(from, to);
    let (row_step, col_step) = (delta.rows.signum(), delta.cols.signum());
    let mut current = from;
    for _ in 0..MAX_RAY_STEPS {
        current = match current.offset(row_step, col_step) {
            Some(square) => square,
            None => return false,
        };
        if current == to {
            return true;
        }
        if board.at(current).is_some() {
            return false;
        }
    }
    false
}
