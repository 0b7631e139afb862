//! Square-centric ("mailbox") board representation and the primitive that
//! mutates it: [`Board::apply`].
//!
//! The board does not know whose turn it is and does not validate anything:
//! it is the state the rules in [`crate::chess::rules`] and
//! [`crate::chess::check`] reason about. A game never stores the board
//! independently of its move history; it is always derived via
//! [`Board::replay`].

use std::fmt::{self, Write};

use anyhow::bail;
use strum::IntoEnumIterator;

use crate::chess::core::{
    File,
    Move,
    Piece,
    PieceKind,
    Rank,
    Side,
    Square,
    BOARD_SIZE,
    BOARD_WIDTH,
};

/// Piece kinds of the major and minor pieces from file a to file h.
const BACKRANK: [PieceKind; BOARD_WIDTH as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 8x8 grid of (possibly) occupied squares addressed by [`Square`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; BOARD_SIZE as usize],
}

impl Board {
    /// Board without any pieces.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [None; BOARD_SIZE as usize],
        }
    }

    /// Canonical starting layout: Black's pieces on rows 0 and 1 (ranks 8 and
    /// 7), White's pieces mirrored on rows 7 and 6.
    ///
    /// ```
    /// use arbiter::chess::board::Board;
    ///
    /// assert_eq!(
    ///     Board::starting().to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for side in [Side::White, Side::Black] {
            for (col, kind) in (0..BOARD_WIDTH).zip(BACKRANK) {
                board.put(side.backrank_row(), col, Piece::new(side, kind));
                board.put(
                    side.pawns_starting_row(),
                    col,
                    Piece::new(side, PieceKind::Pawn),
                );
            }
        }
        board
    }

    fn put(&mut self, row: u8, col: u8, piece: Piece) {
        if let Some(square) = Square::from_row_col(row, col) {
            self.set(square, Some(piece));
        }
    }

    /// Returns the piece standing on the square, if any.
    #[must_use]
    pub const fn at(&self, square: Square) -> Option<Piece> {
        self.squares[square as usize]
    }

    /// Overwrites the contents of the square.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square as usize] = piece;
    }

    /// Applies the move without any legality checks: the piece on `from` (if
    /// any) is relocated to `to`, overwriting whatever was there, and `from`
    /// becomes empty. If the move carries a promotion, the relocated piece is
    /// replaced by the promoted kind of the same side.
    ///
    /// This is also used for speculative application of illegal moves during
    /// check detection, so it must never panic. Rolling back is done by
    /// re-deriving the board, not by reverting the move.
    pub fn apply(&mut self, next_move: &Move) {
        let moved = self.at(next_move.from);
        self.set(next_move.from, None);
        self.set(
            next_move.to,
            match (moved, next_move.promotion) {
                (Some(piece), Some(promotion)) => Some(Piece::new(piece.side, promotion.into())),
                (piece, _) => piece,
            },
        );
    }

    /// Folds the starting layout through all moves in order.
    #[must_use]
    pub fn replay(moves: &[Move]) -> Self {
        moves.iter().fold(Self::starting(), |mut board, next_move| {
            board.apply(next_move);
            board
        })
    }

    /// Iterates over all squares occupied by the pieces of given side.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(move |square| match self.at(square) {
            Some(piece) if piece.side == side => Some((square, piece)),
            _ => None,
        })
    }

    /// Location of the side's king. A well-formed position has exactly one.
    #[must_use]
    pub fn king(&self, side: Side) -> Option<Square> {
        self.pieces(side)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(square, _)| square)
    }

    /// Parses the piece placement field of [Forsyth-Edwards Notation], e.g.
    /// `"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"`. Any trailing FEN
    /// fields are ignored.
    ///
    /// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    pub fn from_placement(input: &str) -> anyhow::Result<Self> {
        let Some(placement) = input.split_whitespace().next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let mut result = Self::empty();
        let mut rows = 0;
        for (row, rank_fen) in placement.split('/').enumerate() {
            let Some(row) = u8::try_from(row).ok().filter(|row| *row < BOARD_WIDTH) else {
                bail!("incorrect FEN: expected 8 ranks, got {placement}");
            };
            rows += 1;
            let mut col: u8 = 0;
            for symbol in rank_fen.chars() {
                match symbol {
                    '0' => bail!("increment can not be 0"),
                    '1'..='8' => {
                        col += symbol as u8 - b'0';
                    },
                    _ => {
                        let piece = Piece::try_from(symbol)?;
                        match Square::from_row_col(row, col) {
                            Some(square) => result.set(square, Some(piece)),
                            None => bail!("incorrect FEN: rank {rank_fen} is too long"),
                        }
                        col += 1;
                    },
                }
                if col > BOARD_WIDTH {
                    bail!("incorrect FEN: rank {rank_fen} is too long");
                }
            }
            if col != BOARD_WIDTH {
                bail!(
                    "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {col}"
                );
            }
        }
        if rows != BOARD_WIDTH {
            bail!("incorrect FEN: there should be 8 ranks, got {placement}");
        }
        Ok(result)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Board {
    /// Prints board representation in FEN piece placement format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            let mut empty_squares = 0i32;
            for file in File::iter() {
                if let Some(piece) = self.at(Square::new(file, rank)) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    write!(f, "{piece}")?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                f.write_char(RANK_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    /// Dumps the board as a diagram ('.' for empty square, FEN algebraic
    /// symbol for piece) with rank and file labels. This is what the text
    /// front-end shows to the players.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}{SQUARE_SEPARATOR}")?;
            for file in File::iter() {
                match self.at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{piece}"),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    write!(f, "{SQUARE_SEPARATOR}")?;
                }
            }
            write!(f, "{LINE_SEPARATOR}")?;
        }
        write!(f, "{SQUARE_SEPARATOR}")?;
        for file in File::iter() {
            write!(f, "{SQUARE_SEPARATOR}{file}")?;
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";
