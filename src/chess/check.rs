//! Check and checkmate detection on top of the [movement rules], plus
//! enumeration of fully legal moves.
//!
//! A move is legal when it has a valid shape and does not leave the king of
//! the moving side attacked. Legality is tested by applying the move to a
//! copy of the board: [`Board`] is a plain array, so the copy is cheap and the
//! position the caller holds is never touched.
//!
//! [movement rules]: crate::chess::rules

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::chess::board::Board;
use crate::chess::core::{Move, PieceKind, Promotion, Side, Square};
use crate::chess::rules;

/// Capacity of [`MoveList`]. No position reachable from the starting layout
/// comes close to it (the known maximum is 218).
pub const MAX_MOVES: usize = 256;

/// Legal moves in a position. Stored inline to avoid allocations.
pub type MoveList = ArrayVec<Move, MAX_MOVES>;

/// Returns true if any piece of the opponent of `side` can move onto the
/// square occupied by the king of `side`. A side without a king is never in
/// check.
///
/// Attacks are judged by the movement rules alone: an attacker that is
/// itself pinned still gives check.
#[must_use]
pub fn in_check(board: &Board, side: Side) -> bool {
    let Some(king) = board.king(side) else {
        return false;
    };
    board
        .pieces(side.opponent())
        .any(|(square, _)| rules::is_valid_shape(board, &Move::new(square, king, None)))
}

/// Applies the move to a copy of `board` and tells whether the side that made
/// it is in check afterwards. A move from an empty square has no mover and
/// never leaves anything in check.
#[must_use]
pub fn leaves_king_in_check(board: &Board, next_move: &Move) -> bool {
    let Some(piece) = board.at(next_move.from) else {
        return false;
    };
    let mut after = *board;
    after.apply(next_move);
    in_check(&after, piece.side)
}

/// A move is legal if there is a piece to move, the piece can make such a
/// move and the move does not expose its own king.
///
/// Promotion is not part of legality: the piece simply becomes the promoted
/// kind, wherever it lands.
#[must_use]
pub fn is_legal(board: &Board, next_move: &Move) -> bool {
    board.at(next_move.from).is_some()
        && rules::is_valid_shape(board, next_move)
        && !leaves_king_in_check(board, next_move)
}

/// Collects all legal moves of `side`, ordered by origin and then target
/// square. Pawn moves onto the last row are expanded into four promotions.
#[must_use]
pub fn legal_moves(board: &Board, side: Side) -> MoveList {
    let mut moves = MoveList::new();
    for (from, piece) in board.pieces(side) {
        for to in Square::iter() {
            let candidate = Move::new(from, to, None);
            if !is_legal(board, &candidate) {
                continue;
            }
            if piece.kind == PieceKind::Pawn && to.row() == side.opponent().backrank_row() {
                for promotion in [
                    Promotion::Queen,
                    Promotion::Rook,
                    Promotion::Bishop,
                    Promotion::Knight,
                ] {
                    push(&mut moves, Move::new(from, to, Some(promotion)));
                }
            } else {
                push(&mut moves, candidate);
            }
        }
    }
    moves
}

// Positions built by hand may have more moves than fit; the rest is dropped.
fn push(moves: &mut MoveList, next_move: Move) {
    if !moves.is_full() {
        moves.push(next_move);
    }
}

/// Same as `!legal_moves(board, side).is_empty()` but stops at the first
/// legal move.
#[must_use]
pub fn has_legal_move(board: &Board, side: Side) -> bool {
    board.pieces(side).any(|(from, _)| {
        Square::iter().any(|to| is_legal(board, &Move::new(from, to, None)))
    })
}

/// The side is checkmated when it is in check and no legal move gets it out.
/// A side that is not in check but has no moves is stalemated, which is not
/// reported here.
#[must_use]
pub fn is_checkmate(board: &Board, side: Side) -> bool {
    in_check(board, side) && !has_legal_move(board, side)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn setup(placement: &str) -> Board {
        Board::from_placement(placement).expect("valid placement")
    }

    #[test]
    fn starting_position() {
        let board = Board::starting();
        assert!(!in_check(&board, Side::White));
        assert!(!in_check(&board, Side::Black));
        assert_eq!(legal_moves(&board, Side::White).len(), 20);
        assert_eq!(legal_moves(&board, Side::Black).len(), 20);
        assert!(has_legal_move(&board, Side::White));
        assert!(!is_checkmate(&board, Side::White));
    }

    #[test]
    fn check_by_each_kind() {
        // Rook on the open file.
        assert!(in_check(&setup("4k3/8/8/8/8/8/8/4R1K1"), Side::Black));
        // Bishop on the diagonal.
        assert!(in_check(&setup("4k3/8/8/1B6/8/8/8/6K1"), Side::Black));
        // Knight jump.
        assert!(in_check(&setup("4k3/8/3N4/8/8/8/8/6K1"), Side::Black));
        // Pawns attack diagonally forward only.
        assert!(in_check(&setup("4k3/3P4/8/8/8/8/8/6K1"), Side::Black));
        assert!(!in_check(&setup("4k3/4P3/8/8/8/8/8/6K1"), Side::Black));
        assert!(in_check(&setup("6k1/8/8/8/8/8/5p2/4K3"), Side::White));
        assert!(!in_check(&setup("6k1/8/8/8/8/5p2/8/4K3"), Side::White));
        // Blocked rook.
        assert!(!in_check(&setup("4k3/8/8/4n3/8/8/8/4R1K1"), Side::Black));
    }

    #[test]
    fn missing_king() {
        let board = setup("8/8/8/8/8/8/8/R3K3");
        assert!(!in_check(&board, Side::Black));
        assert!(!is_checkmate(&board, Side::Black));
    }

    #[test]
    fn pinned_piece() {
        let board = setup("4k3/4r3/8/8/8/8/4B3/4K3");
        let mv = Move::new(Square::E2, Square::D3, None);
        assert!(rules::is_valid_shape(&board, &mv));
        assert!(leaves_king_in_check(&board, &mv));
        assert!(!is_legal(&board, &mv));
        // The king can step aside.
        assert!(is_legal(&board, &Move::new(Square::E1, Square::D1, None)));
        // The position handed in is unchanged.
        assert_eq!(board, setup("4k3/4r3/8/8/8/8/4B3/4K3"));
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let board = setup("4k3/8/8/8/8/8/3r4/4K3");
        // Capturing the undefended rook is fine, stepping next to it is not.
        assert!(is_legal(&board, &Move::new(Square::E1, Square::D2, None)));
        assert!(!is_legal(&board, &Move::new(Square::E1, Square::E2, None)));
        assert!(!is_legal(&board, &Move::new(Square::E1, Square::D1, None)));
        assert!(is_legal(&board, &Move::new(Square::E1, Square::F1, None)));
    }

    #[test]
    fn scholars_mate() {
        let board = setup("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR");
        assert!(in_check(&board, Side::Black));
        assert!(!has_legal_move(&board, Side::Black));
        assert!(legal_moves(&board, Side::Black).is_empty());
        assert!(is_checkmate(&board, Side::Black));
        assert!(!is_checkmate(&board, Side::White));
    }

    #[test]
    fn check_with_escape() {
        // The queen can be captured by the king.
        let board = setup("4k3/4Q3/8/8/8/8/8/6K1");
        assert!(in_check(&board, Side::Black));
        assert!(!is_checkmate(&board, Side::Black));
        let moves = legal_moves(&board, Side::Black);
        assert_eq!(moves.as_slice(), &[Move::new(Square::E8, Square::E7, None)]);
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        let board = setup("7k/5Q2/6K1/8/8/8/8/8");
        assert!(!in_check(&board, Side::Black));
        assert!(!has_legal_move(&board, Side::Black));
        assert!(!is_checkmate(&board, Side::Black));
    }

    #[test]
    fn promotions_are_expanded() {
        let board = setup("4k3/P7/8/8/8/8/8/4K3");
        let promotions: Vec<_> = legal_moves(&board, Side::White)
            .into_iter()
            .filter(|mv| mv.from == Square::A7)
            .collect();
        assert_eq!(
            promotions,
            vec![
                Move::new(Square::A7, Square::A8, Some(Promotion::Queen)),
                Move::new(Square::A7, Square::A8, Some(Promotion::Rook)),
                Move::new(Square::A7, Square::A8, Some(Promotion::Bishop)),
                Move::new(Square::A7, Square::A8, Some(Promotion::Knight)),
            ]
        );
    }
}
