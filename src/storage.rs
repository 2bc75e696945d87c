use std::{
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde_json::Value;
use tokio::{fs, io::AsyncWriteExt};
use tracing::instrument;
use uuid::Uuid;

use crate::document::{
    default_title, empty_content, Document, DocumentChanges, DocumentId, DocumentSummary,
};

const RECORD_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {0} does not exist")]
    NotFound(String),
    #[error("storage failure")]
    Storage(#[from] io::Error),
    #[error("document {0} is not a valid record")]
    Parse(String, #[source] serde_json::Error),
}

/// File-per-document store. Each record lives in `<data_dir>/<id>.json` and is
/// only ever replaced whole.
#[derive(Debug)]
pub struct DocumentStore {
    data_dir: PathBuf,
    ids: Mutex<IdAllocator>,
    clock: Mutex<Stamper>,
}

impl DocumentStore {
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        tracing::info!(data_dir = %data_dir.display(), "document store opened");

        Ok(Self {
            data_dir,
            ids: Mutex::new(IdAllocator::default()),
            clock: Mutex::new(Stamper::default()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Summaries of every record in the directory. Only a file that cannot be
    /// read or is not JSON at all is reported under the corrupted sentinel.
    /// Files whose name is not a valid id are skipped, since they could never
    /// be fetched.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        let mut entries = fs::read_dir(&self.data_dir).await.map_err(|error| {
            tracing::error!(?error, "failed to read data directory");
            error
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match DocumentId::parse(stem) {
                Some(id) => ids.push(id),
                None => {
                    tracing::debug!(file = %path.display(), "skipping file without a valid id")
                }
            }
        }

        let summaries = join_all(ids.into_iter().map(|id| self.summarize(id))).await;
        Ok(summaries)
    }

    async fn summarize(&self, id: DocumentId) -> DocumentSummary {
        match self.read_record(&id).await {
            Ok(document) => document.summary(),
            Err(error) => {
                tracing::warn!(%id, ?error, "unreadable record listed as corrupted");
                DocumentSummary::corrupted(id.to_string())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Document, StoreError> {
        let id = existing_id(id)?;
        self.read_record(&id).await.map_err(|error| {
            if !matches!(error, StoreError::NotFound(_)) {
                tracing::error!(?error, "failed to read record");
            }
            error
        })
    }

    async fn read_record(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let bytes = match fs::read(self.record_path(id.as_str())).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(error) => return Err(error.into()),
        };

        let record: Value = serde_json::from_slice(&bytes)
            .map_err(|error| StoreError::Parse(id.to_string(), error))?;
        Ok(Document::from_record(id.clone(), &record))
    }

    #[instrument(skip(self))]
    pub async fn create(&self) -> Result<Document, StoreError> {
        let updated_at = self.stamp();
        loop {
            let id = self
                .ids
                .lock()
                .expect("id allocator lock")
                .next(Utc::now().timestamp_millis());

            let document = Document {
                id,
                title: default_title(),
                content: empty_content(),
                updated_at: Some(updated_at),
            };

            match self.write(&document, WriteMode::CreateNew).await {
                Ok(()) => {
                    tracing::info!(id = %document.id, "document created");
                    return Ok(document);
                }
                Err(StoreError::Storage(error))
                    if error.kind() == io::ErrorKind::AlreadyExists =>
                {
                    tracing::debug!(id = %document.id, "id already taken, allocating another");
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Replaces the record wholesale. Concurrent updates race and the last
    /// rename wins.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: &str,
        changes: DocumentChanges,
    ) -> Result<Document, StoreError> {
        let id = existing_id(id)?;
        if !fs::try_exists(self.record_path(id.as_str())).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let document = Document {
            title: changes.title_or_default(),
            content: changes.content_or_default(),
            updated_at: Some(self.stamp()),
            id,
        };
        self.write(&document, WriteMode::Replace).await?;

        tracing::debug!(id = %document.id, "document updated");
        Ok(document)
    }

    /// Writes the record to a scratch file, syncs it, then moves it into
    /// place, so readers only ever see complete records. `CreateNew` links
    /// instead of renaming and fails with `AlreadyExists` when the id is taken,
    /// which also holds across processes sharing the directory.
    async fn write(&self, document: &Document, mode: WriteMode) -> Result<(), StoreError> {
        let target = self.record_path(document.id.as_str());
        let scratch = self
            .data_dir
            .join(format!(".{}.{}.tmp", document.id, Uuid::new_v4()));

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|error| StoreError::Parse(document.id.to_string(), error))?;

        let written = async {
            let mut file = fs::File::create(&scratch).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            match mode {
                WriteMode::Replace => fs::rename(&scratch, &target).await,
                WriteMode::CreateNew => fs::hard_link(&scratch, &target).await,
            }
        }
        .await;

        let _ = fs::remove_file(&scratch).await;
        match written {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Err(error.into()),
            Err(error) => {
                tracing::error!(?error, id = %document.id, "failed to write record");
                Err(error.into())
            }
        }
    }

    fn stamp(&self) -> DateTime<Utc> {
        self.clock.lock().expect("clock lock").next(Utc::now())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }
}

#[derive(Debug, Clone, Copy)]
enum WriteMode {
    CreateNew,
    Replace,
}

fn existing_id(id: &str) -> Result<DocumentId, StoreError> {
    DocumentId::parse(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
}

/// Millisecond timestamp ids, with a `-<n>` suffix for ids handed out within
/// the same millisecond.
#[derive(Debug, Default)]
struct IdAllocator {
    last_millis: i64,
    sequence: u32,
}

impl IdAllocator {
    fn next(&mut self, now_millis: i64) -> DocumentId {
        if now_millis > self.last_millis {
            self.last_millis = now_millis;
            self.sequence = 0;
        } else {
            self.sequence += 1;
        }

        let id = match self.sequence {
            0 => self.last_millis.to_string(),
            n => format!("{}-{}", self.last_millis, n),
        };
        DocumentId::parse(&id).expect("numeric ids are valid")
    }
}

/// Hands out strictly increasing timestamps even when the wall clock stalls or
/// steps backwards.
#[derive(Debug, Default)]
struct Stamper {
    last: Option<DateTime<Utc>>,
}

impl Stamper {
    fn next(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}
