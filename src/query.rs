//! Free-text search, country and current-status filtering over a segment.

use serde::Serialize;

use crate::segments::{Segment, SegmentRow};
use crate::table::Column;

/// Country value meaning "no country filter".
pub const ALL_COUNTRIES: &str = "All";

const SEARCH_COLUMNS: [Column; 3] = [Column::OrderNumber, Column::CustomerName, Column::FleekId];

/// Search term, country and current-status selection for one view.
///
/// Every part is optional and they combine with AND. An empty term, the
/// `"All"` country and an empty status list leave the segment untouched.
/// The term is matched as given, surrounding spaces included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub search: Option<String>,
    pub country: Option<String>,
    /// `Current_Status` values to keep; empty keeps every row.
    pub statuses: Vec<String>,
    pub search_vendor: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            search: None,
            country: None,
            statuses: Vec::new(),
            search_vendor: true,
        }
    }
}

impl Filter {
    pub fn new(search: Option<String>, country: Option<String>) -> Self {
        Self {
            search,
            country,
            ..Default::default()
        }
    }

    /// Keeps only rows whose `Current_Status` is one of `statuses`.
    pub fn with_statuses(mut self, statuses: Vec<String>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Leaves `vendor` out of the searchable fields.
    pub fn without_vendor_search(mut self) -> Self {
        self.search_vendor = false;
        self
    }

    fn term(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    fn country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_COUNTRIES)
    }

    fn search_columns(&self) -> Vec<Column> {
        let mut columns = SEARCH_COLUMNS.to_vec();
        if self.search_vendor {
            columns.push(Column::Vendor);
        }
        columns
    }

    pub fn is_identity(&self) -> bool {
        self.term().is_none() && self.country().is_none() && self.statuses.is_empty()
    }

    /// Returns a new segment with the rows that pass the filter, in order.
    ///
    /// A part of the filter whose columns are missing from the table is
    /// skipped rather than matching nothing.
    pub fn apply(&self, segment: &Segment) -> Segment {
        if self.is_identity() {
            return segment.clone();
        }

        let schema = segment.schema();
        let columns: Vec<Column> = self
            .search_columns()
            .into_iter()
            .filter(|c| schema.has(*c))
            .collect();
        let term = self.term().filter(|_| !columns.is_empty());
        let country = self.country().filter(|_| schema.has(Column::CustomerCountry));
        let statuses = Some(&self.statuses)
            .filter(|s| !s.is_empty() && schema.has(Column::CurrentStatus));

        let rows: Vec<SegmentRow> = segment
            .rows()
            .iter()
            .filter(|row| {
                let search_ok = term.as_deref().is_none_or(|term| {
                    columns.iter().any(|c| {
                        row.record
                            .field(*c)
                            .is_some_and(|v| v.to_lowercase().contains(term))
                    })
                });
                let country_ok = country.is_none_or(|country| {
                    row.record.customer_country.as_deref() == Some(country)
                });
                let status_ok = statuses.is_none_or(|statuses| {
                    row.record
                        .current_status
                        .as_deref()
                        .is_some_and(|s| statuses.iter().any(|wanted| wanted == s))
                });
                search_ok && country_ok && status_ok
            })
            .cloned()
            .collect();

        segment.with_rows(segment.label(), rows)
    }
}

/// Country choices for a segment: `"All"` then each distinct non-blank
/// country in first-seen order.
pub fn country_options(segment: &Segment) -> Vec<String> {
    let mut options = vec![ALL_COUNTRIES.to_string()];
    options.extend(distinct(segment, |r| r.record.customer_country.as_deref()));
    options
}

/// Distinct non-blank `Current_Status` values in first-seen order. All of
/// them selected is the same as no status filter.
pub fn status_options(segment: &Segment) -> Vec<String> {
    distinct(segment, |r| r.record.current_status.as_deref())
}

fn distinct<'a>(
    segment: &'a Segment,
    value: impl Fn(&'a SegmentRow) -> Option<&'a str>,
) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for v in segment.rows().iter().filter_map(value) {
        if !v.is_empty() && !values.iter().any(|o| o == v) {
            values.push(v.to_string());
        }
    }
    values
}
