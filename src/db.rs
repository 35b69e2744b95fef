use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, Row, Transaction};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::Word;

const CREATE_WORDS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS words (
        id TEXT PRIMARY KEY,
        german_word TEXT NOT NULL,
        article TEXT NOT NULL,
        english_meaning TEXT NOT NULL,
        difficulty TEXT NOT NULL,
        learned INTEGER NOT NULL DEFAULT 0
    );";

const SELECT_WORDS: &str =
    "SELECT id, german_word, article, english_meaning, difficulty, learned FROM words";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("word store at {location} is unavailable: {reason}")]
    Unavailable { location: String, reason: String },
    #[error("word store integrity error: {0}")]
    Integrity(String),
    #[error("invalid word record: {0}")]
    InvalidRecord(String),
    #[error("no word with id {0}")]
    NotFound(Uuid),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Durable collection of words keyed by id.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Inserts every word in one transaction. Either all rows land or none do.
    async fn upsert_all(&self, words: &[Word]) -> Result<(), StoreError>;
    async fn get_all(&self) -> Result<Vec<Word>, StoreError>;
    async fn get_learned(&self) -> Result<Vec<Word>, StoreError>;
    async fn update_learned(&self, id: Uuid, learned: bool) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
    /// Deletes every word and inserts `words` in one transaction. On error
    /// the previous contents are kept.
    async fn replace_all(&self, words: &[Word]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

impl Location {
    fn describe(&self) -> String {
        match self {
            Location::File(path) => path.display().to_string(),
            Location::Memory => ":memory:".to_string(),
        }
    }
}

/// SQLite-backed [`WordStore`]. The database is opened on first use, so a
/// location that cannot be created makes every call fail with
/// [`StoreError::Unavailable`] instead of failing construction.
#[derive(Clone)]
pub struct SqliteStore {
    location: Location,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    pub fn open_in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    pub fn location(&self) -> String {
        self.location.describe()
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        self.with_connection(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
            Ok(n as usize)
        })
        .await
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let location = self.location.clone();
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Unavailable {
                location: location.describe(),
                reason: "connection lock poisoned".to_string(),
            })?;
            if guard.is_none() {
                *guard = Some(open_connection(&location)?);
            }
            match guard.as_mut() {
                Some(conn) => f(conn),
                None => Err(StoreError::Unavailable {
                    location: location.describe(),
                    reason: "connection was not initialised".to_string(),
                }),
            }
        })
        .await?
    }
}

fn open_connection(location: &Location) -> Result<Connection, StoreError> {
    let unavailable = |reason: String| StoreError::Unavailable {
        location: location.describe(),
        reason,
    };

    let conn = match location {
        Location::Memory => Connection::open_in_memory().map_err(|e| unavailable(e.to_string()))?,
        Location::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            }
            Connection::open(path).map_err(|e| unavailable(e.to_string()))?
        }
    };
    conn.execute_batch(CREATE_WORDS_TABLE)
        .map_err(|e| unavailable(e.to_string()))?;
    debug!(location = %location.describe(), "opened word store");
    Ok(conn)
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    let id: String = row.get("id")?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Word {
        id,
        german_word: row.get("german_word")?,
        article: row.get("article")?,
        english_meaning: row.get("english_meaning")?,
        difficulty: row.get("difficulty")?,
        learned: row.get("learned")?,
    })
}

fn map_read_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
            StoreError::Integrity(format!("column {}: {}", column, source))
        }
        rusqlite::Error::InvalidColumnType(column, name, ty) => {
            StoreError::Integrity(format!("column {} ({}) has type {}", column, name, ty))
        }
        other => StoreError::Sqlite(other),
    }
}

fn map_write_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Integrity(
                message.unwrap_or_else(|| "constraint violation".to_string()),
            )
        }
        other => StoreError::Sqlite(other),
    }
}

fn query_words(conn: &Connection, sql: &str) -> Result<Vec<Word>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let words: rusqlite::Result<Vec<Word>> = stmt.query_map([], word_from_row)?.collect();
    words.map_err(map_read_error)
}

/// Validates and inserts inside the caller's transaction; dropping the
/// transaction after an error rolls everything back.
fn insert_words(tx: &Transaction<'_>, words: &[Word]) -> Result<(), StoreError> {
    let mut stmt = tx.prepare(
        "INSERT INTO words (id, german_word, article, english_meaning, difficulty, learned)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for word in words {
        word.validate().map_err(StoreError::InvalidRecord)?;
        stmt.execute(params![
            word.id.to_string(),
            word.german_word,
            word.article,
            word.english_meaning,
            word.difficulty,
            word.learned,
        ])
        .map_err(map_write_error)?;
    }
    Ok(())
}

#[async_trait]
impl WordStore for SqliteStore {
    async fn upsert_all(&self, words: &[Word]) -> Result<(), StoreError> {
        let words = words.to_vec();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            insert_words(&tx, &words)?;
            tx.commit()?;
            debug!(count = words.len(), "stored words");
            Ok(())
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<Word>, StoreError> {
        self.with_connection(|conn| query_words(conn, SELECT_WORDS))
            .await
    }

    async fn get_learned(&self) -> Result<Vec<Word>, StoreError> {
        self.with_connection(|conn| {
            query_words(conn, &format!("{} WHERE learned = 1", SELECT_WORDS))
        })
        .await
    }

    async fn update_learned(&self, id: Uuid, learned: bool) -> Result<(), StoreError> {
        self.with_connection(move |conn| {
            let changed = conn.execute(
                "UPDATE words SET learned = ?1 WHERE id = ?2",
                params![learned, id.to_string()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM words", [])?;
            Ok(())
        })
        .await
    }

    async fn replace_all(&self, words: &[Word]) -> Result<(), StoreError> {
        let words = words.to_vec();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM words", [])?;
            insert_words(&tx, &words)?;
            tx.commit()?;
            debug!(removed, count = words.len(), "replaced words");
            Ok(())
        })
        .await
    }
}
