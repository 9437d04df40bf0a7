//! Read-only reports over the ledger: delivery performance, fraud scan coverage and the riskiest IPs.
use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use cod_common::normalize_text;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{CanonicalStatus, Order},
    fraud::RiskBand,
    metadata::MetadataRecord,
};

/// `part / whole` as a rounded percentage, or 0 when there is no whole.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round() as u32
}

//--------------------------------------  DeliveryStatistics ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatistics {
    pub gross_total: usize,
    pub invalid: usize,
    /// `gross_total - invalid`
    pub valid_total: usize,
    pub confirmed: usize,
    /// Delivered (plainly or after an incident) among confirmed orders
    pub delivered: usize,
    /// In transit among confirmed orders
    pub in_transit: usize,
    pub active_incidents: usize,
    pub returns: usize,
    /// Orders delivered after an incident
    pub resolved_incidents: usize,
    /// Active plus resolved incidents plus returns
    pub total_incidents: usize,
    pub confirmed_pct: u32,
    /// Delivered over confirmed orders that are no longer in transit
    pub delivered_pct: u32,
    pub incidents_pct: u32,
    pub returns_pct: u32,
    pub resolution_pct: u32,
}

pub fn delivery_statistics(orders: &[Order]) -> DeliveryStatistics {
    let mut stats = DeliveryStatistics { gross_total: orders.len(), ..Default::default() };
    for order in orders {
        if order.confirmation.as_ref().is_some_and(|c| c.is_invalid()) {
            stats.invalid += 1;
            continue;
        }
        let status = order.current_status;
        if order.confirmation.as_ref().is_some_and(|c| c.is_confirmed()) {
            stats.confirmed += 1;
            match status {
                Some(CanonicalStatus::Delivered | CanonicalStatus::DeliveredAfterIncident) => stats.delivered += 1,
                Some(CanonicalStatus::InTransit) => stats.in_transit += 1,
                _ => {},
            }
        }
        match status {
            Some(CanonicalStatus::Incident) => stats.active_incidents += 1,
            Some(CanonicalStatus::Returned) => stats.returns += 1,
            Some(CanonicalStatus::DeliveredAfterIncident) => stats.resolved_incidents += 1,
            _ => {},
        }
    }
    stats.valid_total = stats.gross_total - stats.invalid;
    stats.total_incidents = stats.active_incidents + stats.resolved_incidents + stats.returns;
    stats.confirmed_pct = percentage(stats.confirmed, stats.valid_total);
    stats.delivered_pct = percentage(stats.delivered, stats.confirmed.saturating_sub(stats.in_transit));
    stats.incidents_pct = percentage(stats.active_incidents, stats.valid_total);
    stats.returns_pct = percentage(stats.returns, stats.valid_total);
    stats.resolution_pct = percentage(stats.resolved_incidents, stats.total_incidents);
    stats
}

//--------------------------------------   FraudStatistics   ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudStatistics {
    /// Orders with a metadata block
    pub total: usize,
    pub analysed: usize,
    pub not_analysed: usize,
    pub trusted: usize,
    pub review: usize,
    pub suspicious: usize,
    pub analysed_pct: u32,
    pub trusted_pct: u32,
    pub review_pct: u32,
    pub suspicious_pct: u32,
    /// Suspicious over analysed
    pub fraud_rate: u32,
}

pub fn fraud_statistics(orders: &[Order]) -> FraudStatistics {
    let mut stats = FraudStatistics::default();
    for order in orders.iter().filter(|o| o.metadata().is_some()) {
        stats.total += 1;
        if !order.has_risk_label() {
            stats.not_analysed += 1;
            continue;
        }
        stats.analysed += 1;
        match order.risk_label.as_deref().and_then(RiskBand::from_label) {
            Some(RiskBand::Trusted) => stats.trusted += 1,
            Some(RiskBand::Review) => stats.review += 1,
            Some(RiskBand::Suspicious) => stats.suspicious += 1,
            None => {},
        }
    }
    stats.analysed_pct = percentage(stats.analysed, stats.total);
    stats.trusted_pct = percentage(stats.trusted, stats.analysed);
    stats.review_pct = percentage(stats.review, stats.analysed);
    stats.suspicious_pct = percentage(stats.suspicious, stats.analysed);
    stats.fraud_rate = stats.suspicious_pct;
    stats
}

//--------------------------------------    SuspiciousIp     ---------------------------------------------------------
pub const MAX_COMBINED_RISK: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousIp {
    pub ip: String,
    /// Highest score among the IP's labels, adjusted for order and address counts, capped at 10
    pub risk: u32,
    pub max_score: u32,
    pub orders: usize,
    pub distinct_addresses: usize,
    pub rows: Vec<usize>,
    pub details: String,
}

fn label_score() -> &'static Regex {
    static LABEL_SCORE: OnceLock<Regex> = OnceLock::new();
    LABEL_SCORE.get_or_init(|| Regex::new(r"\((\d+)\)").expect("constant regex"))
}

/// The score embedded in a risk label, e.g. 4 for `"⚠️ REVISAR (4)"`.
pub fn score_from_label(label: &str) -> Option<u32> {
    label_score().captures(label).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok())
}

#[derive(Default)]
struct IpTally {
    rows: Vec<usize>,
    addresses: HashSet<String>,
    max_score: u32,
    first_seen: usize,
}

/// IPs that scored high, placed several orders, or shipped to several addresses, riskiest first.
pub fn suspicious_ips(orders: &[Order]) -> Vec<SuspiciousIp> {
    let mut by_ip: HashMap<String, IpTally> = HashMap::new();
    for (row, order) in orders.iter().enumerate() {
        let Some(raw) = order.metadata() else { continue };
        let record = MetadataRecord::extract(raw);
        let Some(ip) = record.ip.clone() else { continue };
        let tally = by_ip.entry(ip).or_insert_with(|| IpTally { first_seen: row, ..Default::default() });
        tally.rows.push(row);
        let address = normalize_text(&record.direccion_completa());
        if !address.is_empty() {
            tally.addresses.insert(address);
        }
        if let Some(score) = order.risk_label.as_deref().and_then(score_from_label) {
            tally.max_score = tally.max_score.max(score);
        }
    }
    let mut result = by_ip
        .into_iter()
        .filter(|(_, t)| t.max_score >= 4 || t.rows.len() >= 2 || t.addresses.len() >= 2)
        .map(|(ip, t)| {
            let (count, addresses) = (t.rows.len(), t.addresses.len());
            let order_bonus = match count {
                n if n >= 3 => 2,
                2 => 1,
                _ => 0,
            };
            let address_bonus = match addresses {
                n if n >= 3 => 2,
                2 => 1,
                _ => 0,
            };
            let mut details = Vec::new();
            if count > 1 {
                details.push(format!("{count} pedidos"));
            }
            if addresses > 1 {
                details.push(format!("{addresses} direcciones"));
            }
            if t.max_score >= 4 {
                details.push(format!("Score máx: {}", t.max_score));
            }
            let entry = SuspiciousIp {
                ip,
                risk: (t.max_score + order_bonus + address_bonus).min(MAX_COMBINED_RISK),
                max_score: t.max_score,
                orders: count,
                distinct_addresses: addresses,
                rows: t.rows,
                details: details.join(", "),
            };
            (t.first_seen, entry)
        })
        .collect::<Vec<_>>();
    // Ties keep ledger order
    result.sort_by(|(a_row, a), (b_row, b)| b.risk.cmp(&a.risk).then(a_row.cmp(b_row)));
    result.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{db_types::ConfirmationStatus, test_utils::metadata_block};

    fn order(confirmation: &str, status: Option<CanonicalStatus>) -> Order {
        let order = Order::new("1").with_confirmation(ConfirmationStatus::from(confirmation.to_string()));
        match status {
            Some(s) => order.with_status(s),
            None => order,
        }
    }

    #[test]
    fn delivery_report() {
        use CanonicalStatus::*;
        let orders = vec![
            order("NO VALIDO", Some(Delivered)),
            order("DIRECT", Some(Delivered)),
            order("WAC", Some(DeliveredAfterIncident)),
            order("CC", Some(InTransit)),
            order("SHOPIFY", Some(Incident)),
            order("SHOPIFY", Some(Returned)),
            order("PENDIENTE", Some(Incident)),
            order("", None),
        ];
        let stats = delivery_statistics(&orders);
        assert_eq!(stats.gross_total, 8);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.valid_total, 7);
        assert_eq!(stats.confirmed, 5);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.in_transit, 1);
        assert_eq!(stats.active_incidents, 2);
        assert_eq!(stats.returns, 1);
        assert_eq!(stats.resolved_incidents, 1);
        assert_eq!(stats.total_incidents, 4);
        assert_eq!(stats.confirmed_pct, 71);
        assert_eq!(stats.delivered_pct, 50);
        assert_eq!(stats.incidents_pct, 29);
        assert_eq!(stats.returns_pct, 14);
        assert_eq!(stats.resolution_pct, 25);
    }

    #[test]
    fn empty_reports_have_zero_percentages() {
        assert_eq!(delivery_statistics(&[]), DeliveryStatistics::default());
        assert_eq!(fraud_statistics(&[]), FraudStatistics::default());
        assert!(suspicious_ips(&[]).is_empty());
    }

    #[test]
    fn fraud_report() {
        let meta = metadata_block("1.1.1.1", "M", "Madrid", "Calle A");
        let orders = vec![
            Order::new("1").with_metadata(meta.clone()).with_risk_label("✅ CONFIABLE (0)"),
            Order::new("2").with_metadata(meta.clone()).with_risk_label("🚨 SOSPECHOSO (7)"),
            Order::new("3").with_metadata(meta.clone()).with_risk_label("⚠️ REVISAR (3)"),
            Order::new("4").with_metadata(meta.clone()).with_risk_label("❓ SIN DATOS"),
            Order::new("5").with_metadata(meta),
            Order::new("6").with_risk_label("✅ CONFIABLE (0)"),
        ];
        let stats = fraud_statistics(&orders);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.analysed, 4);
        assert_eq!(stats.not_analysed, 1);
        assert_eq!((stats.trusted, stats.review, stats.suspicious), (1, 1, 1));
        assert_eq!(stats.analysed_pct, 80);
        assert_eq!(stats.fraud_rate, 25);
    }

    #[test]
    fn label_scores() {
        assert_eq!(score_from_label("⚠️ REVISAR (4)"), Some(4));
        assert_eq!(score_from_label("🚨 SOSPECHOSO (12)"), Some(12));
        assert_eq!(score_from_label("❓ SIN DATOS"), None);
    }

    #[test]
    fn ranks_suspicious_ips() {
        let orders = vec![
            Order::new("1").with_metadata(metadata_block("1.1.1.1", "M", "Madrid", "Calle A")),
            Order::new("2")
                .with_metadata(metadata_block("1.1.1.1", "M", "Madrid", "Calle B"))
                .with_risk_label("⚠️ REVISAR (5)"),
            Order::new("3").with_metadata(metadata_block("1.1.1.1", "M", "Madrid", "Calle C")),
            Order::new("4")
                .with_metadata(metadata_block("2.2.2.2", "B", "Barcelona", "Carrer D"))
                .with_risk_label("⚠️ REVISAR (4)"),
            Order::new("5").with_metadata(metadata_block("3.3.3.3", "V", "Valencia", "Calle E")),
            Order::new("6")
                .with_metadata(metadata_block("4.4.4.4", "V", "Valencia", "Calle F"))
                .with_risk_label("🚨 SOSPECHOSO (9)"),
            Order::new("7").with_metadata(metadata_block("4.4.4.4", "V", "Valencia", "Calle F")),
        ];
        let ranking = suspicious_ips(&orders);
        let ips = ranking.iter().map(|s| (s.ip.as_str(), s.risk)).collect::<Vec<_>>();
        assert_eq!(ips, vec![("4.4.4.4", 10), ("1.1.1.1", 9), ("2.2.2.2", 4)]);
        assert_eq!(ranking[1].details, "3 pedidos, 3 direcciones, Score máx: 5");
        assert_eq!(ranking[1].rows, vec![0, 1, 2]);
        assert_eq!(ranking[0].distinct_addresses, 1);
    }
}
