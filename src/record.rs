//! Typed order rows.
//!
//! Categorical columns are parsed once here into closed enums; a value the
//! dashboard does not track becomes `None` instead of a stray string that
//! later comparisons silently miss.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::dates::parse_timestamp;
use crate::table::{Column, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    QcApproved,
    HandedOver,
    Freight,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::QcApproved, Status::HandedOver, Status::Freight];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "QC_APPROVED" => Some(Status::QcApproved),
            "HANDED_OVER_TO_LOGISTICS_PARTNER" => Some(Status::HandedOver),
            "FREIGHT" => Some(Status::Freight),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::QcApproved => "QC_APPROVED",
            Status::HandedOver => "HANDED_OVER_TO_LOGISTICS_PARTNER",
            Status::Freight => "FREIGHT",
        }
    }

    /// Short name used for segment labels.
    pub fn title(self) -> &'static str {
        match self {
            Status::QcApproved => "Approved",
            Status::HandedOver => "Handover",
            Status::Freight => "Freight",
        }
    }

    /// Column whose timestamp the status ages from.
    pub fn aging_column(self) -> Column {
        match self {
            Status::QcApproved => Column::QcApprovedAt,
            Status::HandedOver | Status::Freight => Column::HandedOverAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Zone {
    PkZone,
    PkQcCenter,
}

impl Zone {
    pub const ALL: [Zone; 2] = [Zone::PkZone, Zone::PkQcCenter];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "PK Zone" => Some(Zone::PkZone),
            "PK QC Center" => Some(Zone::PkQcCenter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::PkZone => "PK Zone",
            Zone::PkQcCenter => "PK QC Center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderType {
    Normal,
    Ai,
}

impl OrderType {
    pub const ALL: [OrderType; 2] = [OrderType::Normal, OrderType::Ai];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Normal Order" => Some(OrderType::Normal),
            "AI Order" => Some(OrderType::Ai),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Normal => "Normal Order",
            OrderType::Ai => "AI Order",
        }
    }
}

/// One order row: the untouched source cells plus the fields the pipeline
/// reads, parsed. Text fields are trimmed; `cells` keeps the raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub cells: Vec<String>,
    pub order_number: Option<String>,
    pub fleek_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_country: Option<String>,
    pub vendor: Option<String>,
    /// Free-form operational status, distinct from `latest_status`.
    pub current_status: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<Status>,
    pub zone: Option<Zone>,
    pub order_type: Option<OrderType>,
    pub qc_approved_at: Option<NaiveDateTime>,
    pub handed_over_at: Option<NaiveDateTime>,
}

impl OrderRecord {
    pub fn from_cells(schema: &Schema, cells: Vec<String>) -> Self {
        let text = |column: Column| -> Option<String> {
            schema
                .position(column)
                .and_then(|i| cells.get(i))
                .map(|v| v.trim().to_string())
        };
        let timestamp = |column: Column| text(column).as_deref().and_then(parse_timestamp);

        let status = text(Column::LatestStatus).as_deref().and_then(Status::parse);
        let zone = text(Column::Zone).as_deref().and_then(Zone::parse);
        let order_type = text(Column::OrderType).as_deref().and_then(OrderType::parse);
        let amount = text(Column::TotalOrderLineAmount)
            .as_deref()
            .and_then(parse_amount);

        let qc_approved_at = timestamp(Column::QcApprovedAt);
        let handed_over_at = timestamp(Column::HandedOverAt);
        let order_number = text(Column::OrderNumber);
        let fleek_id = text(Column::FleekId);
        let customer_name = text(Column::CustomerName);
        let customer_country = text(Column::CustomerCountry);
        let vendor = text(Column::Vendor);
        let current_status = text(Column::CurrentStatus);

        OrderRecord {
            cells,
            order_number,
            fleek_id,
            customer_name,
            customer_country,
            vendor,
            current_status,
            amount,
            status,
            zone,
            order_type,
            qc_approved_at,
            handed_over_at,
        }
    }

    /// The timestamp this record's status ages from.
    pub fn aging_timestamp(&self) -> Option<NaiveDateTime> {
        match self.status?.aging_column() {
            Column::QcApprovedAt => self.qc_approved_at,
            _ => self.handed_over_at,
        }
    }

    /// Value of a searchable text field, if the table carries it.
    pub fn field(&self, column: Column) -> Option<&str> {
        match column {
            Column::OrderNumber => self.order_number.as_deref(),
            Column::FleekId => self.fleek_id.as_deref(),
            Column::CustomerName => self.customer_name.as_deref(),
            Column::CustomerCountry => self.customer_country.as_deref(),
            Column::Vendor => self.vendor.as_deref(),
            Column::CurrentStatus => self.current_status.as_deref(),
            _ => None,
        }
    }
}

/// Parses an amount such as `1,234.50`. Blank or non-numeric cells are `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
