use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::{SourceError, TableSource, decode};
use crate::table::RawTable;

/// Reads one local CSV export. The sub-table name is only used in errors.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableSource for FileSource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self, sheet: &str) -> Result<RawTable, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        debug!(bytes = bytes.len(), "File read");
        decode(sheet, &bytes)
    }
}
