use std::fmt::Write;

use anyhow::Result;
use cod_engine::{
    db_types::{CanonicalStatus, Order},
    stats::{DeliveryStatistics, FraudStatistics, SuspiciousIp},
    ScanSummary,
    SyncReport,
};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};

use crate::config::CodConfig;

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

fn optional_date(order_date: Option<chrono::DateTime<chrono::Utc>>) -> String {
    order_date.map(|d| d.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default()
}

pub fn format_sync_report(report: &SyncReport) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "===============================================================================")?;
    writeln!(f, "{} sync: {} changes applied, {} updates skipped", report.source, report.changes.len(), report.skipped.total())?;
    if report.pages_fetched > 0 {
        writeln!(f, "Pages fetched: {}", report.pages_fetched)?;
    }
    if let Some(reason) = &report.truncation {
        writeln!(f, "⚠️ The feed was only partially read: {reason}")?;
    }
    writeln!(f, "Skipped: {}", report.skipped)?;
    writeln!(f, "===============================================================================")?;
    if report.changes.is_empty() {
        writeln!(f, "No changes")?;
        return Ok(f);
    }
    let mut table = Table::new();
    table.set_titles(row!["Row", "Order", "Customer", "Date", "From", "To", "Reported as", "Tracking"]);
    report.changes.iter().for_each(|c| {
        table.add_row(row![
            c.row + 1,
            c.external_id,
            c.customer_name,
            optional_date(c.order_date),
            CanonicalStatus::display_optional(c.prior),
            c.new,
            c.source_status,
            c.tracking_ref.as_deref().unwrap_or_default()
        ]);
    });
    markdown_style(&mut table);
    writeln!(f, "{table}")?;
    Ok(f)
}

pub fn format_pending_orders(orders: &[(usize, Order)]) -> String {
    if orders.is_empty() {
        return "No orders are waiting on a status update".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["Row", "Order", "Customer", "Phone", "Date", "Status"]);
    orders.iter().for_each(|(row, order)| {
        table.add_row(row![
            row + 1,
            order.external_id,
            order.customer_name,
            order.phone,
            optional_date(order.order_date),
            CanonicalStatus::display_optional(order.current_status)
        ]);
    });
    markdown_style(&mut table);
    format!("{table}\n{} pending orders\n", orders.len())
}

pub fn format_delivery_stats(stats: &DeliveryStatistics) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Metric", "Orders", "%"]);
    table.add_row(row!["Total orders", stats.gross_total, ""]);
    table.add_row(row!["Invalid (NO VALIDO)", stats.invalid, ""]);
    table.add_row(row!["Valid orders", stats.valid_total, ""]);
    table.add_row(row!["Confirmed", stats.confirmed, format!("{}%", stats.confirmed_pct)]);
    table.add_row(row!["In transit", stats.in_transit, ""]);
    table.add_row(row!["Delivered", stats.delivered, format!("{}%", stats.delivered_pct)]);
    table.add_row(row!["Active incidents", stats.active_incidents, format!("{}%", stats.incidents_pct)]);
    table.add_row(row!["Returns", stats.returns, format!("{}%", stats.returns_pct)]);
    table.add_row(row!["Resolved incidents", stats.resolved_incidents, format!("{}%", stats.resolution_pct)]);
    markdown_style(&mut table);
    table.to_string()
}

pub fn format_fraud_stats(stats: &FraudStatistics) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Metric", "Orders", "%"]);
    table.add_row(row!["Orders with metadata", stats.total, ""]);
    table.add_row(row!["Analysed", stats.analysed, format!("{}%", stats.analysed_pct)]);
    table.add_row(row!["Not analysed", stats.not_analysed, ""]);
    table.add_row(row!["✅ Trusted", stats.trusted, format!("{}%", stats.trusted_pct)]);
    table.add_row(row!["⚠️ Review", stats.review, format!("{}%", stats.review_pct)]);
    table.add_row(row!["🚨 Suspicious", stats.suspicious, format!("{}%", stats.suspicious_pct)]);
    markdown_style(&mut table);
    format!("{table}\nFraud rate: {}%\n", stats.fraud_rate)
}

pub fn format_suspicious_ips(ips: &[SuspiciousIp]) -> String {
    if ips.is_empty() {
        return "No suspicious IPs".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["IP", "Risk", "Orders", "Addresses", "Rows", "Details"]);
    ips.iter().for_each(|ip| {
        let rows = ip.rows.iter().map(|r| (r + 1).to_string()).collect::<Vec<_>>().join(", ");
        table.add_row(row![ip.ip, format!("{}/10", ip.risk), ip.orders, ip.distinct_addresses, rows, ip.details]);
    });
    markdown_style(&mut table);
    table.to_string()
}

pub fn format_scan_summary(summary: &ScanSummary) -> String {
    format!(
        "Fraud scan ({}) complete. {} orders scored, {} suspicious.",
        summary.mode, summary.processed, summary.suspicious
    )
}

pub fn format_config(config: &CodConfig) -> String {
    let fraud = &config.fraud;
    let optional_path = |p: &Option<std::path::PathBuf>| p.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
    let mut table = Table::new();
    table.set_titles(row!["Setting", "Value"]);
    table.add_row(row!["Ledger file", config.ledger_path.display()]);
    table.add_row(row!["Worksheet file", optional_path(&config.worksheet_path)]);
    table.add_row(row!["Audit log", optional_path(&config.audit_log_path)]);
    table.add_row(row!["Dropea API", config.dropea.api_url]);
    table.add_row(row!["Dropea page size", config.dropea.page_size]);
    table.add_row(row!["Dropea max pages", config.dropea.max_pages]);
    table.add_row(row!["Geolocation API", config.ip_api.base_url]);
    table.add_row(row!["Geo cache TTL (s)", config.geo_cache.ttl.as_secs()]);
    table.add_row(row!["Geo cache entries", config.geo_cache_max_entries]);
    table.add_row(row!["Repeat window (h)", fraud.analysis.repeat_window.num_hours()]);
    table.add_row(row!["Max addresses per IP", fraud.analysis.max_addresses_per_ip]);
    table.add_row(row!["Lookup pause (ms)", fraud.analysis.lookup_pause.as_millis()]);
    table.add_row(row!["Timezone", fraud.analysis.timezone]);
    table.add_row(row!["Trusted up to", fraud.thresholds.trusted_max]);
    table.add_row(row!["Review up to", fraud.thresholds.review_max]);
    table.add_row(row!["History lookback (days)", fraud.history.lookback_days]);
    table.add_row(row!["History repeats", fraud.history.repeat_threshold]);
    table.add_row(row!["History bonus", fraud.history.bonus_points]);
    markdown_style(&mut table);
    table.to_string()
}

#[cfg(test)]
mod test {
    use cod_engine::{db_types::StatusSource, stats::delivery_statistics};

    use super::*;

    #[test]
    fn empty_reports() {
        let report = SyncReport::new(StatusSource::Worksheet);
        let text = format_sync_report(&report).unwrap();
        assert!(text.contains("Worksheet sync: 0 changes applied"));
        assert!(text.contains("No changes"));
        assert_eq!(format_pending_orders(&[]), "No orders are waiting on a status update");
        assert_eq!(format_suspicious_ips(&[]), "No suspicious IPs");
    }

    #[test]
    fn truncated_reports() {
        let mut report = SyncReport::new(StatusSource::ExternalFeed);
        report.pages_fetched = 1;
        report.truncation = Some("Page 2 failed: timeout".into());
        let text = format_sync_report(&report).unwrap();
        assert!(text.contains("Pages fetched: 1"));
        assert!(text.contains("partially read: Page 2 failed: timeout"));
    }

    #[test]
    fn pending_orders_use_one_based_rows() {
        let orders = vec![(4, Order::new("1005").with_status(CanonicalStatus::Incident))];
        let text = format_pending_orders(&orders);
        assert!(text.contains("| 5 "));
        assert!(text.contains("INCIDENCIA"));
        assert!(text.contains("1 pending orders"));
    }

    #[test]
    fn delivery_table() {
        let stats = delivery_statistics(&[]);
        let text = format_delivery_stats(&stats);
        assert!(text.contains("Confirmed"));
        assert!(text.contains("0%"));
    }
}
