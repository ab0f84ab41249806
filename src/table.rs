//! Raw tabular data as delivered by a source, before any typing.

use csv::ReaderBuilder;
use std::sync::Arc;

/// Header names plus string cells, in source order.
///
/// Every row has exactly `headers.len()` cells; decoding pads short rows
/// and truncates long ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Arc<[String]>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows.into_iter().map(|row| fit_row(row, width)).collect();
        Self {
            headers: headers.into(),
            rows,
        }
    }

    /// Decodes a CSV document whose first record is the header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable CSV document.
    pub fn from_csv(bytes: &[u8]) -> csv::Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &Arc<[String]> {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn schema(&self) -> Schema {
        Schema::new(&self.headers)
    }
}

fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

/// Order-table columns the pipeline knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    OrderNumber,
    FleekId,
    CustomerName,
    CustomerCountry,
    Vendor,
    ItemName,
    ProductBrand,
    LogisticsPartnerName,
    TotalOrderLineAmount,
    LatestStatus,
    CurrentStatus,
    Zone,
    OrderType,
    QcApprovedAt,
    HandedOverAt,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::OrderNumber,
        Column::FleekId,
        Column::CustomerName,
        Column::CustomerCountry,
        Column::Vendor,
        Column::ItemName,
        Column::ProductBrand,
        Column::LogisticsPartnerName,
        Column::TotalOrderLineAmount,
        Column::LatestStatus,
        Column::CurrentStatus,
        Column::Zone,
        Column::OrderType,
        Column::QcApprovedAt,
        Column::HandedOverAt,
    ];

    /// Header name as it appears in the sheet.
    pub fn name(self) -> &'static str {
        match self {
            Column::OrderNumber => "order_number",
            Column::FleekId => "fleek_id",
            Column::CustomerName => "customer_name",
            Column::CustomerCountry => "customer_country",
            Column::Vendor => "vendor",
            Column::ItemName => "item_name",
            Column::ProductBrand => "product_brand",
            Column::LogisticsPartnerName => "logistics_partner_name",
            Column::TotalOrderLineAmount => "total_order_line_amount",
            Column::LatestStatus => "latest_status",
            Column::CurrentStatus => "Current_Status",
            Column::Zone => "QC or zone",
            Column::OrderType => "Order Type",
            Column::QcApprovedAt => "qc_approved_at",
            Column::HandedOverAt => "logistics_partner_handedover_at",
        }
    }
}

/// Positions of the known columns within one table. A column the table
/// does not carry resolves to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    positions: [Option<usize>; Column::ALL.len()],
}

impl Schema {
    pub fn new(headers: &[String]) -> Self {
        let mut positions = [None; Column::ALL.len()];
        for (slot, column) in positions.iter_mut().zip(Column::ALL) {
            *slot = headers.iter().position(|h| h == column.name());
        }
        Self { positions }
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column as usize]
    }

    pub fn has(&self, column: Column) -> bool {
        self.position(column).is_some()
    }

    /// Known columns the table lacks, in declaration order.
    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.has(*c))
            .collect()
    }
}
