//! Reasons a request to the referee can be turned down.

use std::fmt;

use crate::chess::core::{MalformedSquare, Move, Side, Square};

/// A rejected request. None of these leave a [`crate::game::Game`] modified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The actor moved while it was the other side's turn. Holds the side to
    /// move.
    WrongTurn(Side),
    /// The square the move starts from is empty or holds an opponent's piece.
    NotOwner(Square),
    /// The piece can not move like that or its path is blocked.
    IllegalShape(Move),
    /// The move would leave the mover's own king attacked.
    SelfCheck(Move),
    /// The game is already decided. Holds the winner.
    GameOver(Side),
    /// The actor does not play in this game.
    NotParticipant(String),
    /// There is no active game with the given id.
    NoSuchGame(String),
    /// The square could not be parsed.
    MalformedSquare(MalformedSquare),
    /// A player tried to start a game against themselves.
    SelfPlay,
    /// The two players already have an active game.
    GameExists(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongTurn(side) => write!(f, "it is {side}'s turn"),
            Self::NotOwner(square) => write!(f, "you don't have a piece on {square}"),
            Self::IllegalShape(next_move) => write!(
                f,
                "{} to {} is not a valid move for that piece",
                next_move.from, next_move.to
            ),
            Self::SelfCheck(next_move) => write!(
                f,
                "{} to {} would leave your king in check",
                next_move.from, next_move.to
            ),
            Self::GameOver(winner) => write!(f, "the game is over, {winner} won"),
            Self::NotParticipant(id) => write!(f, "{id} is not playing in this game"),
            Self::NoSuchGame(id) => write!(f, "no active game {id}"),
            Self::MalformedSquare(error) => write!(f, "{error}"),
            Self::SelfPlay => f.write_str("you can't play against yourself"),
            Self::GameExists(id) => write!(f, "game {id} is already in progress"),
        }
    }
}

impl std::error::Error for Error {}

impl From<MalformedSquare> for Error {
    fn from(error: MalformedSquare) -> Self {
        Self::MalformedSquare(error)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Error::WrongTurn(Side::Black).to_string(), "it is Black's turn");
        assert_eq!(
            Error::NotOwner(Square::E7).to_string(),
            "you don't have a piece on e7"
        );
        assert_eq!(
            Error::SelfCheck(Move::new(Square::E1, Square::E2, None)).to_string(),
            "e1 to e2 would leave your king in check"
        );
        assert_eq!(
            Error::GameOver(Side::White).to_string(),
            "the game is over, White won"
        );
    }

    #[test]
    fn from_malformed_square() {
        let error = Square::try_from("z9").map_err(Error::from);
        assert!(matches!(error, Err(Error::MalformedSquare(_))));
    }
}
