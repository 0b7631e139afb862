//! Persistence of games between requests.
//!
//! Active games are kept with an expiry date: a game nobody touched for a
//! while is considered abandoned and silently disappears. Finished games are
//! moved to the archive as gzip-compressed JSON so that they can be inspected
//! later (see `replay_archive` in the tools crate).

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, TimeDelta, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::game::{Game, GameId};

/// Active games expire after a day by default.
pub const DEFAULT_TTL: TimeDelta = TimeDelta::hours(24);

/// Storage for active and archived games.
pub trait GameStore {
    /// Stores the game under its id, replacing the previous version and
    /// resetting its expiry.
    fn save(&mut self, game: &Game) -> anyhow::Result<()>;
    /// Returns the active game with given id or `None` if there is none or
    /// it has expired.
    fn load(&mut self, id: &GameId) -> anyhow::Result<Option<Game>>;
    /// Removes the game from the active set. Missing games are ignored.
    fn delete(&mut self, id: &GameId) -> anyhow::Result<()>;
    /// Puts a compressed copy of the game into the archive and returns its
    /// key.
    fn archive(&mut self, game: &Game) -> anyhow::Result<String>;
}

/// An active game along with the time it is dropped at.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    expires_at: DateTime<Utc>,
    game: Game,
}

impl Record {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Archive entries are keyed by the time of archival and the game id:
/// `2024-06-16T12-30-00_lobby_alice_bob`.
fn archive_key(now: DateTime<Utc>, id: &GameId) -> String {
    format!("{}_{id}", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Serializes the game to gzip-compressed JSON.
pub fn compress(game: &Game) -> anyhow::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer(&mut encoder, game).context("serializing game")?;
    Ok(encoder.finish()?)
}

/// Reads a game written by [`compress`].
pub fn decompress(reader: impl Read) -> anyhow::Result<Game> {
    serde_json::from_reader(GzDecoder::new(reader)).context("reading archived game")
}

/// Keeps everything in memory. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryStore {
    ttl: TimeDelta,
    active: HashMap<GameId, Record>,
    archived: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    #[allow(missing_docs)]
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            active: HashMap::new(),
            archived: BTreeMap::new(),
        }
    }

    /// Archived games in key order.
    pub fn archived(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.archived
            .iter()
            .map(|(key, bytes)| (key.as_str(), bytes.as_slice()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl GameStore for MemoryStore {
    fn save(&mut self, game: &Game) -> anyhow::Result<()> {
        let record = Record {
            expires_at: Utc::now() + self.ttl,
            game: game.clone(),
        };
        drop(self.active.insert(game.id(), record));
        Ok(())
    }

    fn load(&mut self, id: &GameId) -> anyhow::Result<Option<Game>> {
        let now = Utc::now();
        if self.active.get(id).is_some_and(|record| record.is_expired(now)) {
            tracing::debug!(%id, "game expired");
            drop(self.active.remove(id));
            return Ok(None);
        }
        Ok(self.active.get(id).map(|record| record.game.clone()))
    }

    fn delete(&mut self, id: &GameId) -> anyhow::Result<()> {
        drop(self.active.remove(id));
        Ok(())
    }

    fn archive(&mut self, game: &Game) -> anyhow::Result<String> {
        let key = archive_key(Utc::now(), &game.id());
        drop(self.archived.insert(key.clone(), compress(game)?));
        Ok(key)
    }
}

/// Stores games as files under a data directory: `active/<id>.json` and
/// `archive/<key>.json.gz`.
#[derive(Debug)]
pub struct DirStore {
    ttl: TimeDelta,
    active: PathBuf,
    archive: PathBuf,
}

impl DirStore {
    /// Opens the store, creating the directories if needed.
    pub fn open(root: impl AsRef<Path>, ttl: TimeDelta) -> anyhow::Result<Self> {
        let root = root.as_ref();
        let active = root.join("active");
        let archive = root.join("archive");
        for dir in [&active, &archive] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating data directory {}", dir.display()))?;
        }
        Ok(Self {
            ttl,
            active,
            archive,
        })
    }

    /// Location of the archived game with given key.
    #[must_use]
    pub fn archive_path(&self, key: &str) -> PathBuf {
        self.archive.join(format!("{key}.json.gz"))
    }

    fn active_path(&self, id: &GameId) -> anyhow::Result<PathBuf> {
        if id.as_str().contains(['/', '\\']) || id.as_str().starts_with('.') {
            bail!("game id \"{id}\" can not be used as a file name");
        }
        Ok(self.active.join(format!("{id}.json")))
    }
}

impl GameStore for DirStore {
    fn save(&mut self, game: &Game) -> anyhow::Result<()> {
        let path = self.active_path(&game.id())?;
        let record = Record {
            expires_at: Utc::now() + self.ttl,
            game: game.clone(),
        };
        let contents = serde_json::to_vec(&record).context("serializing game")?;
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn load(&mut self, id: &GameId) -> anyhow::Result<Option<Game>> {
        let path = self.active_path(id)?;
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let record: Record = serde_json::from_slice(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        if record.is_expired(Utc::now()) {
            tracing::debug!(%id, "game expired");
            self.delete(id)?;
            return Ok(None);
        }
        Ok(Some(record.game))
    }

    fn delete(&mut self, id: &GameId) -> anyhow::Result<()> {
        let path = self.active_path(id)?;
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing {}", path.display()))
            },
            _ => Ok(()),
        }
    }

    fn archive(&mut self, game: &Game) -> anyhow::Result<String> {
        let key = archive_key(Utc::now(), &game.id());
        let path = self.archive_path(&key);
        let mut file =
            fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        file.write_all(&compress(game)?)?;
        Ok(key)
    }
}
