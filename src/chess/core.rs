//! Chess primitives commonly used within [`crate::chess`].

use std::error::Error;
use std::fmt::{self, Write};
use std::ops::Not;

use anyhow::bail;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Board squares: from left to right, from the top (rank 8, where Black is
/// seated) to the bottom. The discriminant is `row * 8 + col`:
///
/// ```
/// use arbiter::chess::core::Square;
///
/// assert_eq!(Square::A8 as u8, 0);
/// assert_eq!(Square::H8 as u8, 7);
/// assert_eq!(Square::A1 as u8, 8 * 7);
/// assert_eq!(Square::H1 as u8, 63);
/// assert_eq!(Square::E2.row(), 6);
/// assert_eq!(Square::E2.col(), 4);
/// ```
///
/// Square is a compact representation using only one byte.
///
/// ```
/// use arbiter::chess::core::Square;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::FromRepr,
    Serialize,
    Deserialize,
)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
}

impl Square {
    /// Connects file (column) and rank to form a full square.
    #[must_use]
    pub fn new(file: File, rank: Rank) -> Self {
        // Both halves are in 0..BOARD_WIDTH, the square is always on the board.
        match Self::from_row_col(rank.row(), file as u8) {
            Some(square) => square,
            None => unreachable!("file and rank are always within the board"),
        }
    }

    /// Creates a square from zero-based row (0 is rank 8) and column (0 is
    /// file a). Returns `None` for coordinates outside of the board.
    #[must_use]
    pub fn from_row_col(row: u8, col: u8) -> Option<Self> {
        if row >= BOARD_WIDTH || col >= BOARD_WIDTH {
            return None;
        }
        Self::from_repr(row * BOARD_WIDTH + col)
    }

    /// Zero-based row: 0 is the far rank for White (rank 8).
    #[must_use]
    pub const fn row(self) -> u8 {
        self as u8 / BOARD_WIDTH
    }

    /// Zero-based column: 0 is file a.
    #[must_use]
    pub const fn col(self) -> u8 {
        self as u8 % BOARD_WIDTH
    }

    /// Column as a file: `A` for column 0.
    #[must_use]
    pub fn file(self) -> File {
        match File::from_repr(self.col()) {
            Some(file) => file,
            None => unreachable!("column is always within the board"),
        }
    }

    /// Row as a rank: `Eight` for row 0.
    #[must_use]
    pub fn rank(self) -> Rank {
        match Rank::from_repr(BOARD_WIDTH - 1 - self.row()) {
            Some(rank) => rank,
            None => unreachable!("row is always within the board"),
        }
    }

    /// Returns the square shifted by given number of rows and columns or
    /// `None` if it would fall off the board.
    #[must_use]
    pub fn offset(self, rows: i8, cols: i8) -> Option<Self> {
        let row = i16::from(self.row()) + i16::from(rows);
        let col = i16::from(self.col()) + i16::from(cols);
        match (u8::try_from(row), u8::try_from(col)) {
            (Ok(row), Ok(col)) => Self::from_row_col(row, col),
            _ => None,
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = MalformedSquare;

    /// Parses algebraic square notation. Both "e2" and "E2" are accepted.
    fn try_from(square: &str) -> Result<Self, MalformedSquare> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            return Err(MalformedSquare(format!(
                "square should be two-char, got \"{square}\" with {} chars",
                square.chars().count()
            )));
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter, strum::FromRepr)]
#[allow(missing_docs)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = MalformedSquare;

    fn try_from(file: char) -> Result<Self, MalformedSquare> {
        let index = u32::from(file.to_ascii_lowercase()).wrapping_sub(u32::from('a'));
        u8::try_from(index)
            .ok()
            .and_then(Self::from_repr)
            .ok_or_else(|| MalformedSquare(format!("file should be within 'a'..='h', got '{file}'")))
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter, strum::FromRepr)]
#[allow(missing_docs)]
pub enum Rank {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
}

impl Rank {
    /// Board row the rank corresponds to: rank 8 is row 0, rank 1 is row 7.
    #[must_use]
    pub const fn row(self) -> u8 {
        BOARD_WIDTH - 1 - self as u8
    }
}

impl TryFrom<char> for Rank {
    type Error = MalformedSquare;

    fn try_from(rank: char) -> Result<Self, MalformedSquare> {
        let index = u32::from(rank).wrapping_sub(u32::from('1'));
        u8::try_from(index)
            .ok()
            .and_then(Self::from_repr)
            .ok_or_else(|| MalformedSquare(format!("rank should be within '1'..='8', got '{rank}'")))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// Wraps a message indicating failure to parse a [`Square`] (or its file and
/// rank) from algebraic notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSquare(pub String);

impl fmt::Display for MalformedSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed square: {}", self.0)
    }
}

impl Error for MalformedSquare {}

/// A standard game of chess is played between two sides: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row delta of a single pawn push: White pawns walk towards row 0.
    pub(super) const fn pawn_direction(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Row on which the pawns of this side start the game.
    pub(super) const fn pawns_starting_row(self) -> u8 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    /// Row of the major and minor pieces in the starting layout.
    pub(super) const fn backrank_row(self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }
}

impl Not for Side {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "White",
            Self::Black => "Black",
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Symbol used in Standard Algebraic Notation. Pawns don't have one.
    #[must_use]
    pub const fn san_symbol(self) -> Option<char> {
        match self {
            Self::Pawn => None,
            Self::Knight => Some('N'),
            Self::Bishop => Some('B'),
            Self::Rook => Some('R'),
            Self::Queen => Some('Q'),
            Self::King => Some('K'),
        }
    }
}

impl From<Promotion> for PieceKind {
    fn from(promotion: Promotion) -> Self {
        match promotion {
            Promotion::Queen => Self::Queen,
            Promotion::Rook => Self::Rook,
            Promotion::Bishop => Self::Bishop,
            Promotion::Knight => Self::Knight,
        }
    }
}

/// Represents a specific piece owned by a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    #[allow(missing_docs)]
    pub side: Side,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// Algebraic notation symbol used in FEN. Uppercase for White, lowercase
    /// for Black.
    #[must_use]
    pub const fn algebraic_symbol(self) -> char {
        let result = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.side {
            Side::White => result.to_ascii_uppercase(),
            Side::Black => result,
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let side = if symbol.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok(Self { side, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.algebraic_symbol())
    }
}

/// A pawn can be promoted to a queen, rook, bishop or a knight.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl TryFrom<&str> for Promotion {
    type Error = anyhow::Error;

    /// Accepts both full piece names ("queen") and UCI suffixes ("q").
    fn try_from(input: &str) -> anyhow::Result<Self> {
        match input.to_ascii_lowercase().as_str() {
            "q" | "queen" => Ok(Self::Queen),
            "r" | "rook" => Ok(Self::Rook),
            "b" | "bishop" => Ok(Self::Bishop),
            "n" | "knight" => Ok(Self::Knight),
            _ => bail!("promotion should be one of queen, rook, bishop, knight, got \"{input}\""),
        }
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        })
    }
}

/// A request to relocate the piece standing on `from` to `to`, optionally
/// replacing it with a promoted piece afterwards. The move carries no
/// information about its legality: that depends on the [`crate::chess::board::Board`]
/// it is applied to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Promotion>,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    /// Parses the move in [UCI format] ("e2e4", "e7e8q").
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    pub fn from_uci(input: &str) -> anyhow::Result<Self> {
        if !input.is_ascii() || !(4..=5).contains(&input.len()) {
            bail!("UCI move should be 4 or 5 ASCII chars, got \"{input}\"");
        }
        let from = Square::try_from(&input[..2])?;
        let to = Square::try_from(&input[2..4])?;
        let promotion = match input.get(4..) {
            Some("") | None => None,
            Some(symbol) => Some(Promotion::try_from(symbol)?),
        };
        Ok(Self::new(from, to, promotion))
    }
}

impl fmt::Display for Move {
    /// Serializes a move in UCI format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn rank() {
        assert_eq!(
            Rank::iter().collect::<Vec<_>>(),
            vec![
                Rank::One,
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Eight,
            ]
        );
        assert_eq!(Rank::Eight.row(), 0);
        assert_eq!(Rank::One.row(), 7);
        assert!(Rank::try_from('9').is_err());
        assert!(Rank::try_from('0').is_err());
    }

    #[test]
    fn file() {
        assert_eq!(File::try_from('a'), Ok(File::A));
        assert_eq!(File::try_from('H'), Ok(File::H));
        assert!(File::try_from('i').is_err());
        assert_eq!(File::C.to_string(), "c");
    }

    #[test]
    fn square() {
        assert_eq!(Square::iter().count(), usize::from(BOARD_SIZE));
        let squares: Vec<_> = [(0u8, 0u8), (7, 7), (0, 7), (7, 0), (6, 4)]
            .iter()
            .map(|&(row, col)| Square::from_row_col(row, col))
            .collect();
        assert_eq!(
            squares,
            vec![
                Some(Square::A8),
                Some(Square::H1),
                Some(Square::H8),
                Some(Square::A1),
                Some(Square::E2)
            ]
        );
        assert_eq!(Square::from_row_col(8, 0), None);
        assert_eq!(Square::from_row_col(0, 8), None);
        assert_eq!(Square::new(File::E, Rank::Four), Square::E4);
        assert_eq!(Square::E4.file(), File::E);
        assert_eq!(Square::E4.rank(), Rank::Four);
        for square in Square::iter() {
            assert_eq!(Square::new(square.file(), square.rank()), square);
        }
    }

    #[test]
    fn algebraic_squares() {
        // row = 8 - rank digit, col = file letter - 'A'.
        assert_eq!(Square::try_from("E2"), Ok(Square::E2));
        assert_eq!(Square::try_from("e2").map(Square::row), Ok(6));
        assert_eq!(Square::try_from("e2").map(Square::col), Ok(4));
        assert_eq!(Square::try_from("a8"), Ok(Square::A8));
        assert_eq!(Square::try_from("h1"), Ok(Square::H1));
        assert!(Square::try_from("").is_err());
        assert!(Square::try_from("e").is_err());
        assert!(Square::try_from("e22").is_err());
        assert!(Square::try_from("i1").is_err());
        assert!(Square::try_from("a9").is_err());
        assert!(Square::try_from("é1").is_err());
        assert_eq!(Square::G7.to_string(), "g7");
    }

    #[test]
    fn offsets() {
        assert_eq!(Square::E2.offset(-2, 0), Some(Square::E4));
        assert_eq!(Square::A1.offset(1, 0), None);
        assert_eq!(Square::A1.offset(0, -1), None);
        assert_eq!(Square::H8.offset(-1, 0), None);
        assert_eq!(Square::B1.offset(-2, 1), Some(Square::C3));
    }

    #[test]
    fn pieces() {
        let piece = Piece::try_from('N').expect("valid symbol");
        assert_eq!(piece, Piece::new(Side::White, PieceKind::Knight));
        assert_eq!(piece.to_string(), "N");
        assert_eq!(
            Piece::try_from('q').expect("valid symbol"),
            Piece::new(Side::Black, PieceKind::Queen)
        );
        assert!(Piece::try_from('x').is_err());
        assert_eq!(!Side::White, Side::Black);
        assert_eq!(Side::Black.opponent(), Side::White);
    }

    #[test]
    fn uci_moves() {
        let mv = Move::from_uci("e7e8q").expect("valid move");
        assert_eq!(mv, Move::new(Square::E7, Square::E8, Some(Promotion::Queen)));
        assert_eq!(mv.to_string(), "e7e8q");
        assert_eq!(
            Move::from_uci("g1f3").expect("valid move").to_string(),
            "g1f3"
        );
        assert!(Move::from_uci("g1f").is_err());
        assert!(Move::from_uci("g1f3x").is_err());
        assert!(Move::from_uci("z1f3").is_err());
        assert_eq!(Promotion::try_from("Knight").ok(), Some(Promotion::Knight));
        assert!(Promotion::try_from("king").is_err());
    }
}
