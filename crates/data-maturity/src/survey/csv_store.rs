use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::leads::{LeadRow, LeadStore, StoreError};

/// Appends lead rows to a local CSV file, one record per row.
#[derive(Debug)]
pub struct CsvLeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Blocking append, called from the blocking pool.
fn append_record(path: &Path, record: &[String]) -> Result<(), StoreError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(file);
    writer.write_record(record)?;
    writer.flush()?;
    Ok(())
}

#[async_trait]
impl LeadStore for CsvLeadStore {
    async fn append_row(&self, row: LeadRow) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let path = self.path.clone();
        let record = row.to_strings();
        tokio::task::spawn_blocking(move || append_record(&path, &record))
            .await
            .map_err(|err| StoreError::Join(err.to_string()))??;

        tracing::debug!(path = %self.path.display(), kind = ?row.kind, "lead row appended");
        Ok(())
    }
}
