//! The engine puts all pieces together: it reads requests line by line,
//! referees the games they refer to and writes the replies.
//!
//! [`Engine::serve`] is the "main loop" of the referee. Each line names the
//! acting player and their opponent, which together with the configured group
//! identify the game:
//!
//! ```text
//! alice start bob [#rrggbb #rrggbb]
//! alice get bob
//! alice moves bob
//! alice move bob e2 e4 [queen|rook|bishop|knight]
//! alice resign bob
//! help
//! quit
//! ```
//!
//! Rejected requests get a reply starting with `error:` and leave the game
//! as it was. Finished games are removed from the active set and archived.

use std::io::{BufRead, Write};

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chess::core::{Move, Promotion, Side, Square};
use crate::config::Config;
use crate::engine::command::Command;
use crate::error::Error;
use crate::game::{Color, Game, GameId, Verdict};
use crate::store::GameStore;

mod command;

/// The Engine handles the requests and does the I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    prefix: String,
    group: String,
    rng: StdRng,
    store: &'a mut dyn GameStore,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates the engine with given configuration, storage and I/O.
    #[must_use]
    pub fn new(
        config: &Config,
        store: &'a mut dyn GameStore,
        input: &'a mut R,
        output: &'a mut W,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            prefix: config.prefix.clone(),
            group: config.group.clone(),
            rng,
            store,
            input,
            output,
        }
    }

    /// Continuously reads the input stream and executes the commands until
    /// "quit" is sent or the input ends.
    ///
    /// Every command gets exactly one reply. A command that fails (rejected
    /// move, unknown game, broken storage) is reported to the sender and the
    /// loop goes on; only failing to read input or write output stops it.
    pub fn serve(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self
                .input
                .read_line(&mut line)
                .context("reading command")?
                == 0
            {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let reply = match Command::parse(&line, &self.prefix) {
                Command::Start {
                    actor,
                    opponent,
                    colors,
                } => self.handle_start(&actor, &opponent, colors),
                Command::Get { actor, opponent } => self.handle_get(&actor, &opponent),
                Command::Moves { actor, opponent } => self.handle_moves(&actor, &opponent),
                Command::Move {
                    actor,
                    opponent,
                    from,
                    to,
                    promotion,
                } => self.handle_move(&actor, &opponent, &from, &to, promotion.as_deref()),
                Command::Resign { actor, opponent } => self.handle_resign(&actor, &opponent),
                Command::Help => Ok(self.help()),
                Command::Quit => break,
                Command::Unknown(command) => Ok(format!(
                    "unknown command \"{command}\", send `{}` for the list of commands",
                    self.with_prefix("help")
                )),
            };
            match reply {
                Ok(reply) => writeln!(self.output, "{reply}")?,
                Err(e) => {
                    if e.downcast_ref::<Error>().is_some() {
                        tracing::debug!("rejected: {e}");
                    } else {
                        tracing::error!("{e:#}");
                    }
                    writeln!(self.output, "error: {e:#}")?;
                },
            }
            self.output.flush()?;
        }
        Ok(())
    }

    fn with_prefix(&self, command: &str) -> String {
        if self.prefix.is_empty() {
            command.to_string()
        } else {
            format!("{} {command}", self.prefix)
        }
    }

    fn help(&self) -> String {
        [
            "<you> start <opponent> [#white #black]: start a game, sides are assigned at random",
            "<you> get <opponent>: show the board",
            "<you> moves <opponent>: list the moves made so far",
            "<you> move <opponent> <from> <to> [queen|rook|bishop|knight]: make a move, e.g. e2 e4",
            "<you> resign <opponent>: give up the game",
            "help: show this message",
            "quit: stop the referee",
        ]
        .iter()
        .map(|line| self.with_prefix(line))
        .collect::<Vec<_>>()
        .join("\n")
    }

    fn load(&mut self, actor: &str, opponent: &str) -> anyhow::Result<Game> {
        let id = GameId::new(&self.group, actor, opponent);
        self.store
            .load(&id)?
            .ok_or_else(|| Error::NoSuchGame(id.to_string()).into())
    }

    /// Archives the game and removes it from the active ones. If archiving
    /// fails, the active game is left as it was.
    fn finish(&mut self, game: &Game) -> anyhow::Result<()> {
        let id = game.id();
        let key = self.store.archive(game)?;
        self.store.delete(&id)?;
        tracing::info!(%id, %key, winner = ?game.winner(), "game archived");
        Ok(())
    }

    fn handle_start(
        &mut self,
        actor: &str,
        opponent: &str,
        colors: Option<(String, String)>,
    ) -> anyhow::Result<String> {
        if actor == opponent {
            return Err(Error::SelfPlay.into());
        }
        let id = GameId::new(&self.group, actor, opponent);
        if self.store.load(&id)?.is_some() {
            return Err(Error::GameExists(id.to_string()).into());
        }
        let mut game = Game::with_random_sides(actor, opponent, self.group.as_str(), &mut self.rng);
        if let Some((white, black)) = colors {
            game = game.with_colors(
                Color::try_from(white.as_str())?,
                Color::try_from(black.as_str())?,
            );
        }
        self.store.save(&game)?;
        tracing::info!(%id, white = %game.white().id, black = %game.black().id, "game started");
        Ok(format!(
            "{} plays White, {} plays Black\n{game}",
            game.white().id,
            game.black().id
        ))
    }

    fn handle_get(&mut self, actor: &str, opponent: &str) -> anyhow::Result<String> {
        Ok(self.load(actor, opponent)?.to_string())
    }

    fn handle_moves(&mut self, actor: &str, opponent: &str) -> anyhow::Result<String> {
        let game = self.load(actor, opponent)?;
        let header = format!("{} vs {}", game.white().id, game.black().id);
        if game.moves().is_empty() {
            return Ok(format!("{header}: no moves yet"));
        }
        Ok(format!("{header}, all moves:\n{}", game.notation()))
    }

    fn handle_move(
        &mut self,
        actor: &str,
        opponent: &str,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut game = self.load(actor, opponent)?;
        let from = Square::try_from(from).map_err(Error::from)?;
        let to = Square::try_from(to).map_err(Error::from)?;
        let promotion = promotion.map(Promotion::try_from).transpose()?;
        let verdict = game.play(actor, Move::new(from, to, promotion))?;
        tracing::info!(id = %game.id(), %actor, %from, %to, "move accepted");
        let reply = format!("{actor} moved {from} to {to}\n{game}");
        match verdict {
            Verdict::Accepted => {
                self.store.save(&game)?;
                Ok(reply)
            },
            Verdict::Checkmate { winner } => {
                self.finish(&game)?;
                Ok(format!("{reply}\nCheckmate! {} wins", winner_id(&game, winner)))
            },
        }
    }

    fn handle_resign(&mut self, actor: &str, opponent: &str) -> anyhow::Result<String> {
        let mut game = self.load(actor, opponent)?;
        let winner = game.resign(actor)?;
        self.finish(&game)?;
        Ok(format!(
            "{actor} resigned, {} ({winner}) wins",
            winner_id(&game, winner)
        ))
    }
}

fn winner_id(game: &Game, winner: Side) -> &str {
    match winner {
        Side::White => &game.white().id,
        Side::Black => &game.black().id,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStore;

    /// Keeps active games in memory but can't archive anything.
    struct ReadOnlyArchive(MemoryStore);

    impl GameStore for ReadOnlyArchive {
        fn save(&mut self, game: &Game) -> anyhow::Result<()> {
            self.0.save(game)
        }

        fn load(&mut self, id: &GameId) -> anyhow::Result<Option<Game>> {
            self.0.load(id)
        }

        fn delete(&mut self, id: &GameId) -> anyhow::Result<()> {
            self.0.delete(id)
        }

        fn archive(&mut self, _game: &Game) -> anyhow::Result<String> {
            anyhow::bail!("archive is read-only")
        }
    }

    fn run(config: &Config, store: &mut dyn GameStore, input: &str) -> String {
        let mut input = input.as_bytes();
        let mut output = Vec::new();
        Engine::new(config, store, &mut input, &mut output)
            .serve()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    /// Starts a game between alice and bob and returns (white, black).
    fn start(store: &mut MemoryStore) -> (String, String) {
        let output = run(&Config::default(), store, "alice start bob\n");
        assert!(output.contains("plays White"), "{output}");
        let game = store
            .load(&GameId::new("local", "alice", "bob"))
            .unwrap()
            .unwrap();
        (game.white().id.clone(), game.black().id.clone())
    }

    #[test]
    fn start_and_get() {
        let mut store = MemoryStore::default();
        let (white, black) = start(&mut store);
        let output = run(&Config::default(), &mut store, &format!("{black} get {white}\n"));
        assert!(output.contains("r n b q k b n r"), "{output}");
        assert!(output.contains("White to move"), "{output}");
    }

    #[test]
    fn refusals() {
        let mut store = MemoryStore::default();
        let output = run(&Config::default(), &mut store, "alice start alice\n");
        assert_eq!(output, "error: you can't play against yourself\n");
        drop(start(&mut store));
        let output = run(&Config::default(), &mut store, "bob start alice\n");
        assert_eq!(output, "error: game local_alice_bob is already in progress\n");
        let output = run(&Config::default(), &mut store, "alice get carol\n");
        assert_eq!(output, "error: no active game local_alice_carol\n");
    }

    #[test]
    fn moves() {
        let mut store = MemoryStore::default();
        let (white, black) = start(&mut store);
        let input = format!(
            "{white} move {black} e2 e4\n{white} move {black} d2 d4\n{black} move {white} E7 E5\n\
             {black} move {white} z9 e5\n{white} moves {black}\n"
        );
        let output = run(&Config::default(), &mut store, &input);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], format!("{white} moved e2 to e4"));
        assert!(output.contains("error: it is Black's turn"), "{output}");
        assert!(output.contains(&format!("{black} moved e7 to e5")), "{output}");
        assert!(output.contains("error: malformed square"), "{output}");
        assert!(output.ends_with(", all moves:\ne4 e5\n"), "{output}");
    }

    #[test]
    fn checkmate_archives() {
        let mut store = MemoryStore::default();
        let (white, black) = start(&mut store);
        let input = format!(
            "{white} move {black} f2 f3\n{black} move {white} e7 e5\n\
             {white} move {black} g2 g4\n{black} move {white} d8 h4\n{white} get {black}\n"
        );
        let output = run(&Config::default(), &mut store, &input);
        assert!(output.contains(&format!("Checkmate! {black} wins")), "{output}");
        assert!(output.ends_with("error: no active game local_alice_bob\n"), "{output}");
        let archived: Vec<_> = store.archived().collect();
        assert_eq!(archived.len(), 1);
        let game = crate::store::decompress(archived[0].1).unwrap();
        assert_eq!(game.winner(), Some(Side::Black));
        assert_eq!(game.notation(), "f3 e5 g4\nQh4#");
    }

    #[test]
    fn resignation_archives() {
        let mut store = MemoryStore::default();
        let (white, black) = start(&mut store);
        let output = run(&Config::default(), &mut store, &format!("{white} resign {black}\n"));
        assert_eq!(output, format!("{white} resigned, {black} (Black) wins\n"));
        assert!(store
            .load(&GameId::new("local", "alice", "bob"))
            .unwrap()
            .is_none());
        assert_eq!(store.archived().count(), 1);
    }

    #[test]
    fn failed_archive_keeps_game() {
        let mut store = ReadOnlyArchive(MemoryStore::default());
        let output = run(&Config::default(), &mut store, "alice start bob\n");
        assert!(output.contains("plays White"), "{output}");
        let output = run(&Config::default(), &mut store, "alice resign bob\n");
        assert_eq!(output, "error: archive is read-only\n");
        let game = store
            .load(&GameId::new("local", "alice", "bob"))
            .unwrap()
            .unwrap();
        assert_eq!(game.winner(), None);
        // The game can still be finished once archiving works again.
        let mut store = store.0;
        let output = run(&Config::default(), &mut store, "alice resign bob\n");
        assert!(output.starts_with("alice resigned"), "{output}");
        assert_eq!(store.archived().count(), 1);
    }

    #[test]
    fn ids_with_separators() {
        let mut store = MemoryStore::default();
        let output = run(
            &Config::default(),
            &mut store,
            "a_b start c\na start b_c\na get b_c\n",
        );
        assert_eq!(output.matches("plays White").count(), 2, "{output}");
        assert!(!output.contains("error:"), "{output}");
        let game = store
            .load(&GameId::new("local", "a", "b_c"))
            .unwrap()
            .unwrap();
        assert!(game.player("a").is_some());
        assert!(game.player("b_c").is_some());
    }

    #[test]
    fn colors() {
        let mut store = MemoryStore::default();
        let output = run(
            &Config::default(),
            &mut store,
            "alice start bob #ff0000 #0000ff\ncarol start dave #nothex #000000\n",
        );
        assert!(output.contains("(#ff0000) vs"), "{output}");
        assert!(output.contains("error: color should be 6 hex digits"), "{output}");
    }

    #[test]
    fn prefix_and_quit() {
        let config = Config {
            prefix: "!chess".to_string(),
            ..Config::default()
        };
        let mut store = MemoryStore::default();
        let output = run(&config, &mut store, "help\n!chess quit\n!chess help\n");
        assert_eq!(
            output,
            "unknown command \"help\", send `!chess help` for the list of commands\n"
        );
    }

    #[test]
    fn seeded_sides() {
        let config = Config {
            seed: Some(7),
            ..Config::default()
        };
        let sides = |store: &mut MemoryStore| {
            drop(run(&config, store, "alice start bob\n"));
            let game = store
                .load(&GameId::new("local", "alice", "bob"))
                .unwrap()
                .unwrap();
            game.white().id.clone()
        };
        assert_eq!(
            sides(&mut MemoryStore::default()),
            sides(&mut MemoryStore::default())
        );
    }
}
