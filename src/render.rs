//! Terminal rendering of dashboard views.

use gops_backlog::dashboard::DashboardState;
use gops_backlog::segments::{AgingCounts, CatalogEntry, Segment, Summary, VendorCount};

const NO_RESULTS: &str = "No results.";

pub fn summary(summary: &Summary, catalog: &[CatalogEntry]) {
    println!("Total orders : {:>8}", summary.total);
    println!("Approved     : {:>8}", summary.approved);
    println!("Handover     : {:>8}", summary.handover);
    println!("Freight      : {:>8}", summary.freight);
    println!();
    println!("{:<44} {:>7} {:>8}", "Segment", "Orders", "30+ days");
    for entry in catalog {
        println!(
            "{:<44} {:>7} {:>8}",
            entry.segment,
            entry.orders,
            entry.aging.buckets.last().map_or(0, |b| b.count)
        );
    }
}

pub fn aging(segment: &Segment, counts: &AgingCounts) {
    println!("{} ({} orders)", segment.label(), segment.len());
    if segment.is_empty() {
        println!("{NO_RESULTS}");
        return;
    }
    for bucket in &counts.buckets {
        println!("{:>6} days  {:>6}", bucket.bucket.label(), bucket.count);
    }
    println!("{:>11}  {:>6}", "no date", counts.unbucketed);
}

pub fn vendors(segment: &Segment, vendors: &[VendorCount], state: &DashboardState) {
    println!("{} ({} orders)", segment.label(), segment.len());
    if vendors.is_empty() {
        println!("{NO_RESULTS}");
        return;
    }
    for v in vendors {
        match state.comment(&v.vendor) {
            Some(comment) => println!("{:<40} {:>6}  # {}", v.vendor, v.count, comment),
            None => println!("{:<40} {:>6}", v.vendor, v.count),
        }
    }
}

pub fn orders(segment: &Segment, limit: usize) {
    println!("{} ({} orders)", segment.label(), segment.len());
    if segment.is_empty() {
        println!("{NO_RESULTS}");
        return;
    }
    println!(
        "{:<16} {:<12} {:<24} {:<14} {:<24} {:>5} {:>6}",
        "Order", "Fleek ID", "Customer", "Country", "Vendor", "Days", "Bucket"
    );
    for row in segment.rows().iter().take(limit) {
        let r = &row.record;
        println!(
            "{:<16} {:<12} {:<24} {:<14} {:<24} {:>5} {:>6}",
            r.order_number.as_deref().unwrap_or("-"),
            r.fleek_id.as_deref().unwrap_or("-"),
            r.customer_name.as_deref().unwrap_or("-"),
            r.customer_country.as_deref().unwrap_or("-"),
            r.vendor.as_deref().unwrap_or("-"),
            row.aging_days.map_or_else(|| "-".to_string(), |d| d.to_string()),
            row.bucket.map_or("-", |b| b.label()),
        );
    }
    if segment.len() > limit {
        println!("... {} more", segment.len() - limit);
    }
}
