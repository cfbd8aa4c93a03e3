use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

pub const DEFAULT_LEADERBOARD_FILE: &str = "leaderboard.json";

const COLUMN_GAP: usize = 4;

/// One finished typing session as stored in the leaderboard file.
///
/// The JSON keys are PascalCase so files written by earlier releases keep
/// loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreRecord {
    pub name: String,
    pub characters_per_minute: u32,
    pub characters_per_second: u32,
}

impl ScoreRecord {
    pub fn new(name: impl Into<String>, cpm: u32, cps: u32) -> Self {
        Self {
            name: name.into(),
            characters_per_minute: cpm,
            characters_per_second: cps,
        }
    }
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard i/o failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("leaderboard file {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed leaderboard.
///
/// Every public operation holds the same lock for its whole body, file access
/// included, so concurrent `add` calls within one process never interleave
/// their writes. Nothing guards against a second process using the same file.
#[derive(Debug)]
pub struct LeaderboardStore {
    path: PathBuf,
    records: Mutex<Vec<ScoreRecord>>,
}

impl LeaderboardStore {
    /// Create a store for `path` and load whatever is already there.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            records: Mutex::new(Vec::new()),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file into memory.
    ///
    /// A missing, unreadable or malformed file yields an empty leaderboard;
    /// the failure is logged and never returned.
    pub fn load(&self) -> Vec<ScoreRecord> {
        let mut records = self.lock();
        *records = match read_records(&self.path) {
            Ok(Some(loaded)) => {
                tracing::debug!(
                    path = %self.path.display(),
                    count = loaded.len(),
                    "leaderboard loaded"
                );
                loaded
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no leaderboard file yet");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, "starting with an empty leaderboard");
                Vec::new()
            }
        };
        records.clone()
    }

    /// Append `record` and persist the whole leaderboard.
    ///
    /// The in-memory append is kept even when the write fails, so memory and
    /// file may differ until the next successful write.
    pub fn add(&self, record: ScoreRecord) {
        let mut records = self.lock();
        records.push(record);
        if let Err(err) = write_records(&self.path, &records) {
            tracing::error!(error = %err, "failed to save leaderboard");
        }
    }

    /// Snapshot of the records in insertion order.
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.lock().clone()
    }

    /// The leaderboard table, best first.
    pub fn render(&self) -> String {
        render_table(&self.lock())
    }

    pub fn show_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let records = self.lock();
        out.write_all(render_table(&records).as_bytes())?;
        out.flush()
    }

    /// Print the leaderboard table to stdout.
    pub fn show(&self) {
        if let Err(err) = self.show_to(&mut io::stdout().lock()) {
            tracing::warn!(error = %err, "failed to print leaderboard");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScoreRecord>> {
        // a panic mid-operation cannot leave the Vec half-updated
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Records ordered by CPM, highest first; equal CPM keeps insertion order.
pub fn ranked(records: &[ScoreRecord]) -> Vec<&ScoreRecord> {
    records
        .iter()
        .sorted_by(|a, b| b.characters_per_minute.cmp(&a.characters_per_minute))
        .collect()
}

pub fn render_table(records: &[ScoreRecord]) -> String {
    let name_width = records
        .iter()
        .map(|r| r.name.width())
        .chain(std::iter::once("Name".width()))
        .max()
        .unwrap_or(0)
        + COLUMN_GAP;

    let mut table = String::from("\nLeaderboard:\n");
    let _ = writeln!(table, "{}{:<8}{}", pad("Name", name_width), "CPM", "CPS");
    for record in ranked(records) {
        let _ = writeln!(
            table,
            "{}{:<8}{}",
            pad(&record.name, name_width),
            record.characters_per_minute,
            record.characters_per_second
        );
    }
    table
}

// `{:<n}` pads by char count, which misaligns wide glyphs
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

fn read_records(path: &Path) -> Result<Option<Vec<ScoreRecord>>, LeaderboardError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LeaderboardError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice::<Option<Vec<ScoreRecord>>>(&bytes)
        .map(|records| Some(records.unwrap_or_default()))
        .map_err(|source| LeaderboardError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_records(path: &Path, records: &[ScoreRecord]) -> Result<(), LeaderboardError> {
    let io_err = |source| LeaderboardError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let data = serde_json::to_vec_pretty(records).map_err(|source| LeaderboardError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(io_err)
}
