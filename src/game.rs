//! A match between two players: who plays which side, whose turn it is, the
//! moves made so far and who won.
//!
//! The move history is authoritative. The [`Board`] kept alongside it is
//! always equal to [`Board::replay`] of the history, and deserialized games
//! recover it the same way.

use std::fmt;

use anyhow::{bail, Context};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chess::board::Board;
use crate::chess::core::{Move, Side};
use crate::chess::{check, notation, rules};
use crate::error::Error;

/// Display color of a player's pieces, printed as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    #[allow(missing_docs)]
    pub red: u8,
    #[allow(missing_docs)]
    pub green: u8,
    #[allow(missing_docs)]
    pub blue: u8,
}

impl Color {
    #[allow(missing_docs)]
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    #[allow(missing_docs)]
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Default display color for the pieces of given side.
    #[must_use]
    pub const fn of(side: Side) -> Self {
        match side {
            Side::White => Self::WHITE,
            Side::Black => Self::BLACK,
        }
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    /// Parses hex triplets: "#1e90ff". The leading '#' is optional.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.is_ascii() {
            bail!("color should be 6 hex digits (\"#rrggbb\"), got \"{input}\"");
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .with_context(|| format!("color should be 6 hex digits, got \"{input}\""))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(input: String) -> anyhow::Result<Self> {
        Self::try_from(input.as_str())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// A participant of the game. The id is opaque: it is whatever the front-end
/// uses to tell people apart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[allow(missing_docs)]
    pub id: String,
    #[allow(missing_docs)]
    pub side: Side,
    #[allow(missing_docs)]
    pub color: Color,
}

impl Player {
    fn new(id: impl Into<String>, side: Side) -> Self {
        Self {
            id: id.into(),
            side,
            color: Color::of(side),
        }
    }
}

/// Key of a game between two players within a group. The same two players
/// get the same id regardless of who plays White:
///
/// ```
/// use arbiter::game::GameId;
///
/// assert_eq!(GameId::new("lobby", "bob", "alice"), GameId::new("lobby", "alice", "bob"));
/// assert_eq!(GameId::new("lobby", "bob", "alice").as_str(), "lobby_alice_bob");
/// ```
///
/// Parts are joined with `_`, so `_` and `%` inside them are percent-encoded
/// and different pairs never share an id:
///
/// ```
/// use arbiter::game::GameId;
///
/// assert_ne!(GameId::new("g", "a_b", "c"), GameId::new("g", "a", "b_c"));
/// assert_eq!(GameId::new("g", "a_b", "c").as_str(), "g_a%5Fb_c");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(String);

impl GameId {
    #[allow(missing_docs)]
    #[must_use]
    pub fn new(group: &str, first: &str, second: &str) -> Self {
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Self(format!(
            "{}_{}_{}",
            escape(group),
            escape(low),
            escape(high)
        ))
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape(part: &str) -> String {
    part.replace('%', "%25").replace('_', "%5F")
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an accepted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The move is fine and the game goes on.
    Accepted,
    /// The move checkmates the opponent.
    Checkmate {
        #[allow(missing_docs)]
        winner: Side,
    },
}

/// Serialized form of a [`Game`]. The board is not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[allow(missing_docs)]
    pub white: Player,
    #[allow(missing_docs)]
    pub black: Player,
    #[allow(missing_docs)]
    pub group: String,
    #[allow(missing_docs)]
    pub moves: Vec<Move>,
    #[allow(missing_docs)]
    pub turn: Side,
    #[allow(missing_docs)]
    pub winner: Option<Side>,
}

/// State of a single match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Snapshot", into = "Snapshot")]
pub struct Game {
    white: Player,
    black: Player,
    group: String,
    moves: Vec<Move>,
    turn: Side,
    winner: Option<Side>,
    board: Board,
}

impl Game {
    /// Creates a game in the starting position with given players on each
    /// side.
    #[must_use]
    pub fn new(white: impl Into<String>, black: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            white: Player::new(white, Side::White),
            black: Player::new(black, Side::Black),
            group: group.into(),
            moves: Vec::new(),
            turn: Side::White,
            winner: None,
            board: Board::starting(),
        }
    }

    /// Flips a coin to decide who of the two players gets White.
    #[must_use]
    pub fn with_random_sides(
        first: impl Into<String>,
        second: impl Into<String>,
        group: impl Into<String>,
        rng: &mut impl Rng,
    ) -> Self {
        if rng.gen_bool(0.5) {
            Self::new(first, second, group)
        } else {
            Self::new(second, first, group)
        }
    }

    /// Overrides the default display colors.
    #[must_use]
    pub fn with_colors(mut self, white: Color, black: Color) -> Self {
        self.white.color = white;
        self.black.color = black;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn id(&self) -> GameId {
        GameId::new(&self.group, &self.white.id, &self.black.id)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    #[must_use]
    pub const fn turn(&self) -> Side {
        self.turn
    }

    /// The winner, once the game is decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        self.winner
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn white(&self) -> &Player {
        &self.white
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn black(&self) -> &Player {
        &self.black
    }

    /// Looks up a participant by id.
    #[must_use]
    pub fn player(&self, id: &str) -> Option<&Player> {
        [&self.white, &self.black]
            .into_iter()
            .find(|player| player.id == id)
    }

    /// The other participant, if `id` plays in this game.
    #[must_use]
    pub fn opponent(&self, id: &str) -> Option<&Player> {
        self.player(id).map(|player| match player.side {
            Side::White => &self.black,
            Side::Black => &self.white,
        })
    }

    /// Whether the side to move is in check.
    #[must_use]
    pub fn in_check(&self) -> bool {
        check::in_check(&self.board, self.turn)
    }

    /// Checks whether `actor` can make the move right now. The game is not
    /// modified either way.
    ///
    /// # Errors
    ///
    /// The first failing check wins, in this order: [`Error::GameOver`],
    /// [`Error::NotParticipant`], [`Error::WrongTurn`], [`Error::NotOwner`],
    /// [`Error::IllegalShape`], [`Error::SelfCheck`].
    pub fn validate(&self, actor: &str, next_move: &Move) -> Result<Verdict, Error> {
        if let Some(winner) = self.winner {
            return Err(Error::GameOver(winner));
        }
        let side = self
            .player(actor)
            .ok_or_else(|| Error::NotParticipant(actor.to_string()))?
            .side;
        if side != self.turn {
            return Err(Error::WrongTurn(self.turn));
        }
        match self.board.at(next_move.from) {
            Some(piece) if piece.side == side => {},
            _ => return Err(Error::NotOwner(next_move.from)),
        }
        if !rules::is_valid_shape(&self.board, next_move) {
            return Err(Error::IllegalShape(*next_move));
        }
        if check::leaves_king_in_check(&self.board, next_move) {
            return Err(Error::SelfCheck(*next_move));
        }
        let mut after = self.board;
        after.apply(next_move);
        if check::is_checkmate(&after, side.opponent()) {
            Ok(Verdict::Checkmate { winner: side })
        } else {
            Ok(Verdict::Accepted)
        }
    }

    /// Appends the move to the history, applies it and passes the turn. No
    /// validation is done here, see [`Game::play`].
    pub fn commit(&mut self, next_move: Move) {
        self.board.apply(&next_move);
        self.moves.push(next_move);
        self.turn = !self.turn;
    }

    /// Validates and commits the move, recording the winner on checkmate.
    ///
    /// # Errors
    ///
    /// Same as [`Game::validate`]; the game is left untouched.
    pub fn play(&mut self, actor: &str, next_move: Move) -> Result<Verdict, Error> {
        let verdict = self.validate(actor, &next_move)?;
        self.commit(next_move);
        if let Verdict::Checkmate { winner } = verdict {
            self.winner = Some(winner);
        }
        Ok(verdict)
    }

    /// Gives the game to the opponent of `actor` regardless of the position
    /// and returns the winner.
    ///
    /// # Errors
    ///
    /// [`Error::GameOver`] if the game is already decided and
    /// [`Error::NotParticipant`] if `actor` does not play in it.
    pub fn resign(&mut self, actor: &str) -> Result<Side, Error> {
        if let Some(winner) = self.winner {
            return Err(Error::GameOver(winner));
        }
        let winner = self
            .opponent(actor)
            .ok_or_else(|| Error::NotParticipant(actor.to_string()))?
            .side;
        self.winner = Some(winner);
        Ok(winner)
    }

    /// Takes back the last move. Decided games can not be undone.
    pub fn undo(&mut self) -> Option<Move> {
        if self.winner.is_some() {
            return None;
        }
        let last = self.moves.pop()?;
        self.board = Board::replay(&self.moves);
        self.turn = !self.turn;
        Some(last)
    }

    /// Board after each prefix of the history: the starting position first,
    /// the current one last.
    #[must_use]
    pub fn positions(&self) -> Vec<Board> {
        let mut board = Board::starting();
        let mut result = Vec::with_capacity(self.moves.len() + 1);
        result.push(board);
        for next_move in &self.moves {
            board.apply(next_move);
            result.push(board);
        }
        result
    }

    /// The history in algebraic notation.
    #[must_use]
    pub fn notation(&self) -> String {
        notation::format_history(&self.moves)
    }
}

impl From<Snapshot> for Game {
    fn from(snapshot: Snapshot) -> Self {
        let board = Board::replay(&snapshot.moves);
        Self {
            white: snapshot.white,
            black: snapshot.black,
            group: snapshot.group,
            moves: snapshot.moves,
            turn: snapshot.turn,
            winner: snapshot.winner,
            board,
        }
    }
}

impl From<Game> for Snapshot {
    fn from(game: Game) -> Self {
        Self {
            white: game.white,
            black: game.black,
            group: game.group,
            moves: game.moves,
            turn: game.turn,
            winner: game.winner,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}) vs {} ({})",
            self.white.id, self.white.color, self.black.id, self.black.color
        )?;
        write!(f, "{:?}", self.board)?;
        match self.winner {
            Some(winner) => write!(f, "\n{winner} won"),
            None if self.in_check() => write!(f, "\n{} to move, in check", self.turn),
            None => write!(f, "\n{} to move", self.turn),
        }
    }
}
