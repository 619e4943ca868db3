//! JSON-lines Action Log Adapter
//!
//! Stores one recorded action per line. The file is only ever appended to.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::actions::RecordedAction;
use crate::ports::{ActionLogError, ActionLogStore};

/// File-backed action log
#[derive(Debug)]
pub struct JsonlActionLog {
    path: PathBuf,
    /// Sequence expected by the next append; read from disk on first use.
    next_sequence: Mutex<Option<u64>>,
}

impl JsonlActionLog {
    /// Create a log stored at `path`
    ///
    /// # Example
    /// ```ignore
    /// let log = JsonlActionLog::new("./data/actions.jsonl");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            next_sequence: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<(), ActionLogError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| ActionLogError::IoError(e.to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ActionLogStore for JsonlActionLog {
    async fn append(&self, recorded: &RecordedAction) -> Result<(), ActionLogError> {
        let mut next = self.next_sequence.lock().await;
        let expected = match *next {
            Some(sequence) => sequence,
            None => self.load().await?.len() as u64,
        };
        if recorded.sequence != expected {
            return Err(ActionLogError::OutOfOrder {
                expected,
                found: recorded.sequence,
            });
        }

        let mut line = serde_json::to_string(recorded).map_err(|e| {
            ActionLogError::SerializationFailed {
                sequence: recorded.sequence,
                reason: e.to_string(),
            }
        })?;
        line.push('\n');

        self.ensure_parent_dir().await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ActionLogError::IoError(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ActionLogError::IoError(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ActionLogError::IoError(e.to_string()))?;

        *next = Some(expected + 1);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<RecordedAction>, ActionLogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ActionLogError::IoError(e.to_string()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| ActionLogError::DeserializationFailed {
                    line: index + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}
