/// A request sent to the referee, one per line.
///
/// Squares, promotions and colors are kept as text here: reporting malformed
/// ones is up to the handlers.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    Start {
        actor: String,
        opponent: String,
        colors: Option<(String, String)>,
    },
    Get {
        actor: String,
        opponent: String,
    },
    Moves {
        actor: String,
        opponent: String,
    },
    Move {
        actor: String,
        opponent: String,
        from: String,
        to: String,
        promotion: Option<String>,
    },
    Resign {
        actor: String,
        opponent: String,
    },
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parses a line. If `prefix` is not empty, the line has to start with it
    /// as a separate word.
    pub(super) fn parse(input: &str, prefix: &str) -> Self {
        fn owned(part: &str) -> String {
            part.to_string()
        }

        let mut parts: Vec<&str> = input.split_whitespace().collect();
        if !prefix.is_empty() {
            if parts.first() != Some(&prefix) {
                return Self::Unknown(input.trim().to_string());
            }
            let _ = parts.remove(0);
        }

        match parts.as_slice() {
            ["help"] => Self::Help,
            ["quit"] => Self::Quit,
            [actor, "start", opponent] => Self::Start {
                actor: owned(actor),
                opponent: owned(opponent),
                colors: None,
            },
            [actor, "start", opponent, white, black] => Self::Start {
                actor: owned(actor),
                opponent: owned(opponent),
                colors: Some((owned(white), owned(black))),
            },
            [actor, "get", opponent] => Self::Get {
                actor: owned(actor),
                opponent: owned(opponent),
            },
            [actor, "moves", opponent] => Self::Moves {
                actor: owned(actor),
                opponent: owned(opponent),
            },
            [actor, "move", opponent, from, to] => Self::Move {
                actor: owned(actor),
                opponent: owned(opponent),
                from: owned(from),
                to: owned(to),
                promotion: None,
            },
            [actor, "move", opponent, from, to, promotion] => Self::Move {
                actor: owned(actor),
                opponent: owned(opponent),
                from: owned(from),
                to: owned(to),
                promotion: Some(owned(promotion)),
            },
            [actor, "resign", opponent] => Self::Resign {
                actor: owned(actor),
                opponent: owned(opponent),
            },
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_help_and_quit() {
        assert_eq!(Command::parse("help", ""), Command::Help);
        assert_eq!(Command::parse("  quit\n", ""), Command::Quit);
    }

    #[test]
    fn parse_start() {
        assert_eq!(
            Command::parse("alice start bob", ""),
            Command::Start {
                actor: "alice".to_string(),
                opponent: "bob".to_string(),
                colors: None,
            }
        );
        assert_eq!(
            Command::parse("alice start bob #ff0000 #0000ff", ""),
            Command::Start {
                actor: "alice".to_string(),
                opponent: "bob".to_string(),
                colors: Some(("#ff0000".to_string(), "#0000ff".to_string())),
            }
        );
        assert_eq!(
            Command::parse("alice start bob #ff0000", ""),
            Command::Unknown("alice start bob #ff0000".to_string())
        );
    }

    #[test]
    fn parse_queries() {
        assert_eq!(
            Command::parse("alice get bob", ""),
            Command::Get {
                actor: "alice".to_string(),
                opponent: "bob".to_string(),
            }
        );
        assert_eq!(
            Command::parse("bob moves alice", ""),
            Command::Moves {
                actor: "bob".to_string(),
                opponent: "alice".to_string(),
            }
        );
    }

    #[test]
    fn parse_move() {
        assert_eq!(
            Command::parse("alice move bob e2 e4", ""),
            Command::Move {
                actor: "alice".to_string(),
                opponent: "bob".to_string(),
                from: "e2".to_string(),
                to: "e4".to_string(),
                promotion: None,
            }
        );
        assert_eq!(
            Command::parse("alice move bob A7 A8 queen", ""),
            Command::Move {
                actor: "alice".to_string(),
                opponent: "bob".to_string(),
                from: "A7".to_string(),
                to: "A8".to_string(),
                promotion: Some("queen".to_string()),
            }
        );
        assert_eq!(
            Command::parse("alice move bob e2", ""),
            Command::Unknown("alice move bob e2".to_string())
        );
    }

    #[test]
    fn parse_resign() {
        assert_eq!(
            Command::parse("alice resign bob", ""),
            Command::Resign {
                actor: "alice".to_string(),
                opponent: "bob".to_string(),
            }
        );
    }

    #[test]
    fn prefix() {
        assert_eq!(Command::parse("!chess help", "!chess"), Command::Help);
        assert_eq!(
            Command::parse("help", "!chess"),
            Command::Unknown("help".to_string())
        );
        assert_eq!(
            Command::parse("!chesshelp", "!chess"),
            Command::Unknown("!chesshelp".to_string())
        );
    }

    #[test]
    fn unknown() {
        assert_eq!(
            Command::parse("alice castle bob", ""),
            Command::Unknown("alice castle bob".to_string())
        );
        assert_eq!(Command::parse("", ""), Command::Unknown(String::new()));
    }
}
