//! Segmentation: named views over one ingested snapshot and the counts the
//! dashboard reports for them.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::aging::{AgingBucket, aging_days};
use crate::record::{OrderRecord, OrderType, Status, Zone};
use crate::table::{Column, RawTable, Schema};

/// Predicate selecting one segment: a status, optionally narrowed to a zone
/// and an order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentSpec {
    pub status: Status,
    pub zone: Option<Zone>,
    pub order_type: Option<OrderType>,
}

impl SegmentSpec {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            zone: None,
            order_type: None,
        }
    }

    pub fn zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    pub fn matches(&self, record: &OrderRecord) -> bool {
        if record.status != Some(self.status) {
            return false;
        }
        // Handover only tracks the two PK zones; other zones never count.
        if self.status == Status::HandedOver && record.zone.is_none() {
            return false;
        }
        if self.zone.is_some() && record.zone != self.zone {
            return false;
        }
        self.order_type.is_none() || record.order_type == self.order_type
    }

    pub fn label(&self) -> String {
        let mut label = self.status.title().to_string();
        if let Some(zone) = self.zone {
            label.push_str(" / ");
            label.push_str(zone.as_str());
        }
        if let Some(order_type) = self.order_type {
            label.push_str(" / ");
            label.push_str(order_type.as_str());
        }
        label
    }
}

impl fmt::Display for SegmentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One row of a segment with its age resolved against the snapshot's `now`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub record: Arc<OrderRecord>,
    pub aging_days: Option<i64>,
    pub bucket: Option<AgingBucket>,
}

/// Read-only view of matching rows in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    label: String,
    headers: Arc<[String]>,
    schema: Schema,
    rows: Vec<SegmentRow>,
}

/// Count per aging bucket, all 13 buckets always present in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgingCounts {
    pub buckets: Vec<BucketCount>,
    pub bucketed: usize,
    pub unbucketed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: AgingBucket,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorCount {
    pub vendor: String,
    pub count: usize,
}

impl AgingCounts {
    pub fn count(&self, bucket: AgingBucket) -> usize {
        self.buckets[bucket.index()].count
    }

    pub fn total(&self) -> usize {
        self.bucketed + self.unbucketed
    }
}

impl Segment {
    pub fn new(
        label: impl Into<String>,
        headers: Arc<[String]>,
        schema: Schema,
        rows: Vec<SegmentRow>,
    ) -> Self {
        Self {
            label: label.into(),
            headers,
            schema,
            rows,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[SegmentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Same headers and label, different rows.
    pub fn with_rows(&self, label: impl Into<String>, rows: Vec<SegmentRow>) -> Self {
        Self::new(label, self.headers.clone(), self.schema.clone(), rows)
    }

    fn retain(&self, label: String, keep: impl Fn(&SegmentRow) -> bool) -> Self {
        let rows = self.rows.iter().filter(|r| keep(*r)).cloned().collect();
        self.with_rows(label, rows)
    }

    /// Rows grouped by aging bucket. Rows without a bucket are counted in
    /// `unbucketed` so the totals always match the segment size.
    pub fn aging_counts(&self) -> AgingCounts {
        let mut counts = [0usize; AgingBucket::ALL.len()];
        let mut unbucketed = 0;

        for row in &self.rows {
            match row.bucket {
                Some(bucket) => counts[bucket.index()] += 1,
                None => unbucketed += 1,
            }
        }

        AgingCounts {
            buckets: AgingBucket::ALL
                .into_iter()
                .map(|bucket| BucketCount {
                    bucket,
                    count: counts[bucket.index()],
                })
                .collect(),
            bucketed: counts.iter().sum(),
            unbucketed,
        }
    }

    /// Orders per vendor, most first. Ties keep first-seen order. Empty when
    /// the table has no vendor column.
    pub fn vendor_counts(&self) -> Vec<VendorCount> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<VendorCount> = Vec::new();

        for vendor in self.rows.iter().filter_map(|r| r.record.vendor.as_deref()) {
            match index.get(vendor) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(vendor, counts.len());
                    counts.push(VendorCount {
                        vendor: vendor.to_string(),
                        count: 1,
                    });
                }
            }
        }

        // sort_by is stable
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Drill-down into a single aging bucket.
    pub fn in_bucket(&self, bucket: AgingBucket) -> Self {
        self.retain(format!("{} / {} days", self.label, bucket), |r| {
            r.bucket == Some(bucket)
        })
    }

    /// Drill-down into a single vendor, matched exactly.
    pub fn for_vendor(&self, vendor: &str) -> Self {
        self.retain(format!("{} / {}", self.label, vendor), |r| {
            r.record.vendor.as_deref() == Some(vendor)
        })
    }

    /// Sum of parseable order-line amounts.
    pub fn total_amount(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.record.amount).sum()
    }
}

/// Per-status sizes shown on the summary cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub approved: usize,
    pub handover: usize,
    pub freight: usize,
}

/// One catalog line: a named segment, its size, and its aging counts.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub segment: String,
    pub orders: usize,
    pub aging: AgingCounts,
}

/// A fetched table ingested once against a fixed `now`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    now: NaiveDateTime,
    headers: Arc<[String]>,
    schema: Schema,
    records: Vec<Arc<OrderRecord>>,
}

impl Snapshot {
    pub fn build(table: &RawTable, now: NaiveDateTime) -> Self {
        let schema = table.schema();
        let missing = schema.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
            debug!(missing = ?names, "Table lacks some known columns");
        }

        let records: Vec<Arc<OrderRecord>> = table
            .rows()
            .iter()
            .map(|cells| Arc::new(OrderRecord::from_cells(&schema, cells.clone())))
            .collect();

        let untracked = records.iter().filter(|r| r.status.is_none()).count();
        debug!(
            rows = records.len(),
            untracked_status = untracked,
            %now,
            "Snapshot built"
        );

        Self {
            now,
            headers: table.headers().clone(),
            schema,
            records,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn segment(&self, spec: &SegmentSpec) -> Segment {
        let rows = self
            .records
            .iter()
            .filter(|r| spec.matches(r))
            .map(|record| {
                let days = aging_days(record.aging_timestamp(), self.now);
                SegmentRow {
                    record: Arc::clone(record),
                    aging_days: days,
                    bucket: days.and_then(AgingBucket::from_days),
                }
            })
            .collect();

        Segment::new(spec.label(), self.headers.clone(), self.schema.clone(), rows)
    }

    pub fn summary(&self) -> Summary {
        let approved = self.segment(&SegmentSpec::new(Status::QcApproved)).len();
        let handover = self.segment(&SegmentSpec::new(Status::HandedOver)).len();
        let freight = self.segment(&SegmentSpec::new(Status::Freight)).len();
        Summary {
            total: approved + handover + freight,
            approved,
            handover,
            freight,
        }
    }

    /// Every status × zone × order-type segment the dashboard links to.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let zones = [None, Some(Zone::PkZone), Some(Zone::PkQcCenter)];
        let order_types = [None, Some(OrderType::Normal), Some(OrderType::Ai)];

        let mut entries = Vec::new();
        for status in Status::ALL {
            for zone in zones {
                for order_type in order_types {
                    let spec = SegmentSpec {
                        status,
                        zone,
                        order_type,
                    };
                    let segment = self.segment(&spec);
                    entries.push(CatalogEntry {
                        segment: spec.label(),
                        orders: segment.len(),
                        aging: segment.aging_counts(),
                    });
                }
            }
        }
        entries
    }

    /// Whether vendor grouping is available for this table.
    pub fn has_vendors(&self) -> bool {
        self.schema.has(Column::Vendor)
    }
}
