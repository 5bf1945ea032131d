//! Directory walk and per-file transactional ingestion

use std::fmt;
use std::path::Path;

use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, instrument, warn};

use wx_core::{parse_line, DatasetProvider};
use wx_db::{insert_observation, DbClient};

use crate::{IngestError, IngestResult};

/// File extension recognized as station data
pub const DATA_EXTENSION: &str = "txt";

/// Counts for one successfully committed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub station_id: String,
    pub new_records: u64,
    pub duplicates: u64,
    pub malformed: u64,
}

/// Aggregate counts for one ingestion run.
///
/// Files that failed and rolled back contribute nothing beyond the
/// failed-file count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_processed: u64,
    pub files_failed: u64,
    pub new_records: u64,
    pub duplicates: u64,
    pub malformed: u64,
}

impl IngestReport {
    fn absorb(&mut self, file: &FileReport) {
        self.files_processed += 1;
        self.new_records += file.new_records;
        self.duplicates += file.duplicates;
        self.malformed += file.malformed;
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new records, {} duplicates, {} malformed lines across {} files ({} failed)",
            self.new_records, self.duplicates, self.malformed, self.files_processed, self.files_failed
        )
    }
}

/// Ingestion engine bound to one store
pub struct IngestEngine {
    db: DbClient,
}

impl IngestEngine {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    /// Satisfy the dataset precondition: when the data directory is
    /// missing, ask the provider collaborator to populate it.
    pub async fn ensure_dataset(
        &self,
        data_dir: &Path,
        provider: Option<&dyn DatasetProvider>,
    ) -> IngestResult<()> {
        if fs::try_exists(data_dir).await? {
            return Ok(());
        }
        match provider {
            Some(provider) => {
                info!(dir = %data_dir.display(), "data directory missing, fetching dataset");
                provider.provide(data_dir).await.map_err(IngestError::Fetch)
            }
            None => Err(IngestError::MissingDataDir(data_dir.to_path_buf())),
        }
    }

    /// Ingest every recognized file in the data directory.
    ///
    /// The filename stem is the station id. Only setup failures abort the
    /// run; a failing file is rolled back, logged, and skipped.
    #[instrument(skip(self, provider))]
    pub async fn ingest_dir(
        &self,
        data_dir: &Path,
        provider: Option<&dyn DatasetProvider>,
    ) -> IngestResult<IngestReport> {
        self.ensure_dataset(data_dir, provider).await?;

        let mut files = Vec::new();
        let mut entries = fs::read_dir(data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(DATA_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();

        info!("found {} files to process", files.len());

        let mut report = IngestReport::default();
        for (i, path) in files.iter().enumerate() {
            let Some(station_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(file = %path.display(), "skipping file without a usable station id");
                report.files_failed += 1;
                continue;
            };

            info!(
                "processing file {}/{}: {} for station {}",
                i + 1,
                files.len(),
                path.display(),
                station_id
            );

            match self.ingest_file(station_id, path).await {
                Ok(file_report) => {
                    info!(
                        "completed {}: {} new records, {} duplicates",
                        path.display(),
                        file_report.new_records,
                        file_report.duplicates
                    );
                    report.absorb(&file_report);
                }
                Err(err) => {
                    error!(file = %path.display(), error = %err, "error processing file, continuing");
                    report.files_failed += 1;
                }
            }
        }

        info!(%report, "ingestion complete");
        Ok(report)
    }

    /// Ingest one station file inside a single transaction.
    ///
    /// Malformed lines are counted and skipped; duplicate keys are counted
    /// and skipped. Any error rolls back the whole file.
    #[instrument(skip(self))]
    pub async fn ingest_file(&self, station_id: &str, path: &Path) -> IngestResult<FileReport> {
        let file = fs::File::open(path).await?;
        let mut lines = BufReader::new(file).lines();

        let mut tx = self.db.begin().await?;
        let mut report = FileReport {
            station_id: station_id.to_string(),
            ..Default::default()
        };

        while let Some(line) = lines.next_line().await? {
            match parse_line(&line) {
                Ok(obs) => {
                    if insert_observation(&mut *tx, station_id, &obs).await? {
                        report.new_records += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                Err(reason) => {
                    warn!(line = %line.trim(), %reason, "skipping malformed line");
                    report.malformed += 1;
                }
            }
        }

        tx.commit().await.map_err(wx_db::DbError::from)?;
        Ok(report)
    }
}
