//! Per-session dashboard state and the load/refresh boundary.
//!
//! Everything a view needs is passed in explicitly: the snapshot comes from
//! [`LoadState`], the view and filter live in [`DashboardState`].

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{error, info};

use crate::aging::AgingBucket;
use crate::query::Filter;
use crate::segments::{Segment, SegmentSpec, Snapshot};
use crate::source::{CachedSource, TableSource};

/// Which screen the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Summary,
    Segment(SegmentSpec),
    Bucket(SegmentSpec, AgingBucket),
    Vendor(SegmentSpec, String),
    /// One vendor's orders within one aging bucket.
    VendorBucket(SegmentSpec, AgingBucket, String),
}

impl View {
    pub fn spec(&self) -> Option<&SegmentSpec> {
        match self {
            View::Summary => None,
            View::Segment(spec)
            | View::Bucket(spec, _)
            | View::Vendor(spec, _)
            | View::VendorBucket(spec, _, _) => Some(spec),
        }
    }
}

/// Session state: current view, active filter, and vendor comments.
///
/// Comments are held in memory for the session only.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub view: View,
    pub filter: Filter,
    comments: HashMap<String, String>,
}

impl DashboardState {
    pub fn new(view: View, filter: Filter) -> Self {
        Self {
            view,
            filter,
            comments: HashMap::new(),
        }
    }

    /// Moves to another view. The filter is kept.
    pub fn navigate(&mut self, view: View) {
        self.view = view;
    }

    pub fn set_comment(&mut self, vendor: impl Into<String>, comment: impl Into<String>) {
        let comment = comment.into();
        let vendor = vendor.into();
        if comment.trim().is_empty() {
            self.comments.remove(&vendor);
        } else {
            self.comments.insert(vendor, comment);
        }
    }

    pub fn comment(&self, vendor: &str) -> Option<&str> {
        self.comments.get(vendor).map(String::as_str)
    }

    /// Rows for the current view after filtering; `None` on the summary view.
    pub fn rows(&self, snapshot: &Snapshot) -> Option<Segment> {
        let segment = match &self.view {
            View::Summary => return None,
            View::Segment(spec) => snapshot.segment(spec),
            View::Bucket(spec, bucket) => snapshot.segment(spec).in_bucket(*bucket),
            View::Vendor(spec, vendor) => snapshot.segment(spec).for_vendor(vendor),
            View::VendorBucket(spec, bucket, vendor) => snapshot
                .segment(spec)
                .in_bucket(*bucket)
                .for_vendor(vendor),
        };
        Some(self.filter.apply(&segment))
    }
}

/// Outcome of one pipeline pass: a snapshot, or the message shown next to
/// the retry action.
#[derive(Debug, Clone)]
pub enum LoadState {
    Ready(Snapshot),
    Failed { message: String },
}

impl LoadState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            LoadState::Ready(snapshot) => Some(snapshot),
            LoadState::Failed { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }
}

/// Loads `sheet` through the cache and ingests it against `now`.
///
/// Source errors become [`LoadState::Failed`]; nothing is raised.
#[tracing::instrument(skip(source))]
pub async fn load<S: TableSource>(
    source: &CachedSource<S>,
    sheet: &str,
    now: NaiveDateTime,
) -> LoadState {
    match source.load(sheet).await {
        Ok(table) => {
            let snapshot = Snapshot::build(&table, now);
            info!(rows = snapshot.len(), "Snapshot ready");
            LoadState::Ready(snapshot)
        }
        Err(e) => {
            error!(error = %e, "Failed to load sheet");
            LoadState::Failed {
                message: format!("Error loading {sheet}: {e}"),
            }
        }
    }
}

/// The refresh action: clears the cache, then loads again.
pub async fn retry<S: TableSource>(
    source: &CachedSource<S>,
    sheet: &str,
    now: NaiveDateTime,
) -> LoadState {
    source.invalidate();
    load(source, sheet, now).await
}
