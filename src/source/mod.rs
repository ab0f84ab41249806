//! Tabular data sources.
//!
//! [`TableSource`] is the async trait for "fetch the rows of sub-table X".
//! [`SheetSource`] reads a Google Sheets CSV export over HTTP,
//! [`FileSource`] reads a local CSV file, and [`CachedSource`] memoizes any
//! source for a fixed time-to-live.

mod cache;
mod file;
mod sheets;

pub use cache::CachedSource;
pub use file::FileSource;
pub use sheets::SheetSource;

use crate::table::RawTable;

/// Failures at the source boundary.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request for sheet '{sheet}' failed: {source}")]
    Http {
        sheet: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid source url '{0}'")]
    Url(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sheet '{sheet}' is not valid CSV: {source}")]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },
}

/// Provides raw tables by sub-table name.
#[async_trait::async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch(&self, sheet: &str) -> Result<RawTable, SourceError>;
}

#[async_trait::async_trait]
impl<T: TableSource + ?Sized> TableSource for Box<T> {
    async fn fetch(&self, sheet: &str) -> Result<RawTable, SourceError> {
        (**self).fetch(sheet).await
    }
}

fn decode(sheet: &str, bytes: &[u8]) -> Result<RawTable, SourceError> {
    RawTable::from_csv(bytes).map_err(|source| SourceError::Csv {
        sheet: sheet.to_string(),
        source,
    })
}
