//! CLI entry point for the G-Ops backlog dashboard.
//!
//! Loads the order sheet (Google Sheets export or a local CSV), then shows
//! summary cards, aging and vendor breakdowns, filtered order lists, CSV
//! exports, or keeps refreshing on an interval.

mod render;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gops_backlog::aging::AgingBucket;
use gops_backlog::config::Config;
use gops_backlog::dashboard::{self, DashboardState, LoadState, View};
use gops_backlog::fetch::BasicClient;
use gops_backlog::output::{export_segment, print_pretty};
use gops_backlog::query::{Filter, country_options, status_options};
use gops_backlog::record::{OrderType, Status, Zone};
use gops_backlog::segments::{Segment, SegmentSpec, Snapshot};
use gops_backlog::source::{CachedSource, FileSource, SheetSource, TableSource};
use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gops_backlog")]
#[command(about = "Order aging and vendor backlog from the G-Ops sheet", long_about = None)]
struct Cli {
    /// Read a local CSV export instead of the Google Sheet
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Spreadsheet id (overrides GOPS_SHEET_ID)
    #[arg(long, global = true)]
    sheet_id: Option<String>,

    /// Sheet tab to read (overrides GOPS_SHEET_NAME)
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Print results as JSON (summary, aging, vendors and orders)
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Report(Report),
    /// Reload on an interval and log the summary each round
    Watch {
        /// Seconds between refreshes (defaults to GOPS_REFRESH_SECS)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of rounds (0 = until interrupted)
        #[arg(short = 'n', long, default_value_t = 0)]
        rounds: usize,

        /// Fetch from the source every round instead of within GOPS_CACHE_TTL_SECS
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
}

/// One-shot commands over a single freshly loaded snapshot.
#[derive(Subcommand)]
enum Report {
    /// Summary cards and every segment's size
    Summary,
    /// Orders per aging bucket for one segment
    Aging {
        #[command(flatten)]
        segment: SegmentArgs,
    },
    /// Orders per vendor for one segment, most first
    Vendors {
        #[command(flatten)]
        segment: SegmentArgs,

        /// Session note shown next to a vendor, as VENDOR=TEXT
        #[arg(long, value_name = "VENDOR=TEXT")]
        comment: Vec<String>,
    },
    /// List the orders of a segment, optionally drilled down and filtered
    Orders {
        #[command(flatten)]
        segment: SegmentArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum rows to print
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Write a segment's rows, all source columns, to CSV
    Export {
        #[command(flatten)]
        segment: SegmentArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// File to write
        #[arg(short, long, default_value = "orders.csv")]
        output: PathBuf,

        /// Gzip the exported file
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[derive(Args)]
struct SegmentArgs {
    #[arg(long, value_enum)]
    status: StatusArg,

    #[arg(long, value_enum)]
    zone: Option<ZoneArg>,

    #[arg(long, value_enum)]
    order_type: Option<OrderTypeArg>,
}

#[derive(Args)]
struct FilterArgs {
    /// Only orders in this aging bucket, e.g. 0, 6-7, 30+
    #[arg(long, value_parser = parse_bucket)]
    bucket: Option<AgingBucket>,

    /// Only orders from this vendor (exact); combines with --bucket
    #[arg(long)]
    vendor: Option<String>,

    /// Case-insensitive search over order number, customer, fleek id, vendor
    #[arg(short, long)]
    search: Option<String>,

    /// Exact customer country, or "All"
    #[arg(long)]
    country: Option<String>,

    /// Only orders with this Current_Status; repeat to allow several
    #[arg(long, value_name = "STATUS")]
    current_status: Vec<String>,

    /// Do not search the vendor column
    #[arg(long, default_value_t = false)]
    no_vendor_search: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Approved,
    Handover,
    Freight,
}

#[derive(Clone, Copy, ValueEnum)]
enum ZoneArg {
    PkZone,
    PkQcCenter,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderTypeArg {
    Normal,
    Ai,
}

impl SegmentArgs {
    fn spec(&self) -> SegmentSpec {
        let status = match self.status {
            StatusArg::Approved => Status::QcApproved,
            StatusArg::Handover => Status::HandedOver,
            StatusArg::Freight => Status::Freight,
        };
        SegmentSpec {
            status,
            zone: self.zone.map(|z| match z {
                ZoneArg::PkZone => Zone::PkZone,
                ZoneArg::PkQcCenter => Zone::PkQcCenter,
            }),
            order_type: self.order_type.map(|t| match t {
                OrderTypeArg::Normal => OrderType::Normal,
                OrderTypeArg::Ai => OrderType::Ai,
            }),
        }
    }
}

impl FilterArgs {
    fn state(&self, spec: SegmentSpec) -> DashboardState {
        let view = match (self.bucket, &self.vendor) {
            (Some(bucket), Some(vendor)) => View::VendorBucket(spec, bucket, vendor.clone()),
            (Some(bucket), None) => View::Bucket(spec, bucket),
            (None, Some(vendor)) => View::Vendor(spec, vendor.clone()),
            (None, None) => View::Segment(spec),
        };
        let mut filter = Filter::new(self.search.clone(), self.country.clone())
            .with_statuses(self.current_status.clone());
        if self.no_vendor_search {
            filter = filter.without_vendor_search();
        }
        DashboardState::new(view, filter)
    }
}

fn parse_bucket(raw: &str) -> Result<AgingBucket, String> {
    AgingBucket::from_label(raw).ok_or_else(|| {
        let labels: Vec<&str> = AgingBucket::ALL.iter().map(|b| b.label()).collect();
        format!("unknown bucket '{raw}', expected one of {}", labels.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(sheet_id) = cli.sheet_id.clone() {
        config.sheet_id = Some(sheet_id);
    }
    if let Some(sheet) = cli.sheet.clone() {
        config.sheet_name = sheet;
    }

    let _file_guard = init_logging(&config.log_file);

    let source = CachedSource::new(build_source(&cli, &config)?, config.cache_ttl);

    match cli.command {
        Commands::Watch {
            interval,
            rounds,
            refresh,
        } => {
            let interval = interval.map_or(config.refresh_interval, Duration::from_secs);
            watch(&source, &config.sheet_name, interval, rounds, refresh).await
        }
        Commands::Report(report) => {
            let now = Local::now().naive_local();
            let snapshot = match dashboard::load(&source, &config.sheet_name, now).await {
                LoadState::Ready(snapshot) => snapshot,
                LoadState::Failed { message } => bail!(message),
            };
            if snapshot.is_empty() {
                warn!(sheet = %config.sheet_name, "No data available");
            }
            run(report, &snapshot, cli.json)
        }
    }
}

fn run(report: Report, snapshot: &Snapshot, json: bool) -> Result<()> {
    match report {
        Report::Summary => {
            let summary = snapshot.summary();
            let catalog = snapshot.catalog();
            print_pretty(&summary);
            if json {
                let body = serde_json::json!({ "summary": summary, "catalog": catalog });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                render::summary(&summary, &catalog);
            }
        }
        Report::Aging { segment } => {
            let segment = snapshot.segment(&segment.spec());
            let counts = segment.aging_counts();
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                render::aging(&segment, &counts);
            }
        }
        Report::Vendors { segment, comment } => {
            if !snapshot.has_vendors() {
                warn!("Sheet has no vendor column; vendor view unavailable");
            }
            let spec = segment.spec();
            let mut state = DashboardState::new(View::Segment(spec), Filter::default());
            for entry in &comment {
                let (vendor, text) = entry
                    .split_once('=')
                    .ok_or_else(|| anyhow!("comment must be VENDOR=TEXT, got '{entry}'"))?;
                state.set_comment(vendor.trim(), text.trim());
            }
            let segment = snapshot.segment(&spec);
            let vendors = segment.vendor_counts();
            if json {
                println!("{}", serde_json::to_string_pretty(&vendors)?);
            } else {
                render::vendors(&segment, &vendors, &state);
            }
        }
        Report::Orders {
            segment,
            filter,
            limit,
        } => {
            let state = filter.state(segment.spec());
            let rows = view_rows(snapshot, &state)?;
            info!(
                countries = ?country_options(&rows),
                current_statuses = ?status_options(&rows),
                "Filter options"
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&orders_json(&rows, limit))?);
            } else {
                render::orders(&rows, limit);
            }
        }
        Report::Export {
            segment,
            filter,
            output,
            gzip,
        } => {
            let state = filter.state(segment.spec());
            let rows = view_rows(snapshot, &state)?;
            if rows.is_empty() {
                warn!(segment = rows.label(), "Exporting an empty segment");
            }
            export_segment(&rows, &output, gzip)?;
            println!("Wrote {} orders to {}.", rows.len(), output.display());
        }
    }

    Ok(())
}

fn view_rows(snapshot: &Snapshot, state: &DashboardState) -> Result<Segment> {
    state
        .rows(snapshot)
        .context("orders view needs a segment")
}

/// Up to `limit` rows as objects: aging plus every source cell by header.
fn orders_json(rows: &Segment, limit: usize) -> Vec<Value> {
    rows.rows()
        .iter()
        .take(limit)
        .map(|row| {
            let cells: Map<String, Value> = rows
                .headers()
                .iter()
                .cloned()
                .zip(row.record.cells.iter().cloned().map(Value::String))
                .collect();
            serde_json::json!({
                "aging_days": row.aging_days,
                "bucket": row.bucket,
                "cells": cells,
            })
        })
        .collect()
}

fn build_source(cli: &Cli, config: &Config) -> Result<Box<dyn TableSource>> {
    if let Some(path) = &cli.file {
        info!(path = %path.display(), "Using local CSV source");
        return Ok(Box::new(FileSource::new(path)));
    }

    let sheet_id = config
        .sheet_id
        .clone()
        .context("GOPS_SHEET_ID must be set (or pass --sheet-id / --file)")?;
    let client = BasicClient::new(config.http_timeout)?;
    Ok(Box::new(SheetSource::new(client, sheet_id)))
}

/// Reloads on a fixed interval. A failed round clears the cache so the next
/// round goes back to the source; `refresh` clears it every round.
#[tracing::instrument(skip(source), fields(interval_secs = interval.as_secs()))]
async fn watch<S: TableSource>(
    source: &CachedSource<S>,
    sheet: &str,
    interval: Duration,
    rounds: usize,
    refresh: bool,
) -> Result<()> {
    if rounds == 0 {
        info!("Refreshing until interrupted. Press Ctrl+C to stop.");
    }

    let mut round = 0;
    let mut last_failed = false;

    loop {
        if rounds > 0 && round >= rounds {
            break;
        }
        round += 1;

        let now = Local::now().naive_local();
        let state = if refresh || last_failed {
            dashboard::retry(source, sheet, now).await
        } else {
            dashboard::load(source, sheet, now).await
        };

        match &state {
            LoadState::Ready(snapshot) => {
                let summary = snapshot.summary();
                print_pretty(&summary);
                info!(
                    round,
                    total = summary.total,
                    approved = summary.approved,
                    handover = summary.handover,
                    freight = summary.freight,
                    "Backlog summary"
                );
            }
            LoadState::Failed { message } => {
                error!(round, %message, "Round failed; will retry next round");
            }
        }
        last_failed = !state.is_ready();

        if rounds == 0 || round < rounds {
            tokio::time::sleep(interval).await;
        }
    }

    Ok(())
}

/// Colored stderr plus a JSON daily-rolling file.
fn init_logging(log_file_path: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gops_backlog.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_state(args: &[&str]) -> DashboardState {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Report(Report::Orders { segment, filter, .. }) => {
                filter.state(segment.spec())
            }
            _ => panic!("expected the orders command"),
        }
    }

    #[test]
    fn test_bucket_and_vendor_compose() {
        let state = orders_state(&[
            "gops_backlog", "orders", "--status", "approved", "--vendor", "Acme", "--bucket", "5",
        ]);
        assert_eq!(
            state.view,
            View::VendorBucket(
                SegmentSpec::new(Status::QcApproved),
                AgingBucket::Day5,
                "Acme".to_string()
            )
        );
    }

    #[test]
    fn test_single_drill_downs() {
        let bucket = orders_state(&["gops_backlog", "orders", "--status", "freight", "--bucket", "30+"]);
        assert_eq!(
            bucket.view,
            View::Bucket(SegmentSpec::new(Status::Freight), AgingBucket::Over30)
        );

        let segment = orders_state(&["gops_backlog", "orders", "--status", "handover"]);
        assert_eq!(segment.view, View::Segment(SegmentSpec::new(Status::HandedOver)));
    }

    #[test]
    fn test_current_status_is_repeatable() {
        let state = orders_state(&[
            "gops_backlog",
            "orders",
            "--status",
            "approved",
            "--current-status",
            "Ready",
            "--current-status",
            "On Hold",
        ]);
        assert_eq!(state.filter.statuses, vec!["Ready", "On Hold"]);
    }

    #[test]
    fn test_orders_json_carries_cells_and_aging() {
        use chrono::NaiveDate;
        use gops_backlog::table::RawTable;

        let csv = "order_number,latest_status,qc_approved_at\n\
                   PK-1,QC_APPROVED,\"January 1, 2024, 10:00\"\n\
                   PK-2,QC_APPROVED,\n";
        let now = NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let table = RawTable::from_csv(csv.as_bytes()).unwrap();
        let rows = Snapshot::build(&table, now).segment(&SegmentSpec::new(Status::QcApproved));

        let body = orders_json(&rows, 1);
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["aging_days"], 5);
        assert_eq!(body[0]["bucket"], "5");
        assert_eq!(body[0]["cells"]["order_number"], "PK-1");
    }

    #[test]
    fn test_watch_is_its_own_command() {
        let cli = Cli::try_parse_from(["gops_backlog", "watch", "-n", "2", "--refresh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watch {
                rounds: 2,
                refresh: true,
                ..
            }
        ));
    }
}
