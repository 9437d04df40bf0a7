use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use cod_common::strip_accents;
use log::*;

use crate::{
    db_types::Order,
    fraud::{
        join_details,
        FraudConfig,
        IpIndex,
        RiskAssessment,
        ScoringMode,
        SubScore,
    },
    geo_cache::GeolocationCache,
    traits::{GeoLocator, GeoResult, KeyValueCache},
};

pub const GEO_ERROR_DETAIL: &str = "Error al verificar IP";
const SPAIN: [&str; 2] = ["Spain", "España"];

/// Local midnight of `now`'s day in `tz`, expressed in UTC.
pub fn start_of_day(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let midnight = now.with_timezone(&tz).date_naive().and_hms_opt(0, 0, 0);
    match midnight.and_then(|m| tz.from_local_datetime(&m).earliest()) {
        Some(local) => local.with_timezone(&Utc),
        None => now,
    }
}

fn fold(text: &str) -> String {
    strip_accents(&text.trim().to_lowercase())
}

/// Substring match in either direction. An empty side is contained in anything, so a missing city or region counts
/// as a match.
fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

fn format_window(window: chrono::Duration) -> String {
    let minutes = window.num_minutes();
    if minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{minutes}min")
    }
}

/// Scores a single order against the rest of the ledger.
///
/// Each sub-score is independent and can only add points. The scorer itself never fails: a geolocation failure
/// degrades that sub-score to zero and records [`GEO_ERROR_DETAIL`].
pub struct FraudScorer<C, L> {
    geo: GeolocationCache<C, L>,
    config: FraudConfig,
}

impl<C, L> FraudScorer<C, L> {
    pub fn new(geo: GeolocationCache<C, L>, config: FraudConfig) -> Self {
        Self { geo, config }
    }

    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    pub fn geo(&self) -> &GeolocationCache<C, L> {
        &self.geo
    }

    /// Points for a geolocation answer, compared against the declared delivery province and city.
    pub fn geolocation_points(&self, result: &GeoResult, province: &str, city: &str) -> SubScore {
        let points = &self.config.points;
        if !result.is_success() {
            return SubScore::new(points.ip_not_locatable, "IP no localizable");
        }
        let country = result.country.as_deref().unwrap_or_default().trim();
        if !SPAIN.contains(&country) {
            return SubScore::new(points.foreign_ip, format!("IP desde {country}"));
        }
        let ip_region = fold(result.region_name.as_deref().unwrap_or_default());
        let ip_city = fold(result.city.as_deref().unwrap_or_default());
        let delivery_province = self.config.provinces.resolve(province);
        let delivery_city = fold(city);
        if overlaps(&ip_region, &delivery_province) || overlaps(&ip_city, &delivery_city) {
            return SubScore::zero();
        }
        let detail = format!(
            "IP desde {}, entrega en {delivery_province}",
            result.region_name.as_deref().unwrap_or_default()
        );
        let is_far = self
            .config
            .analysis
            .far_provinces
            .iter()
            .map(|p| fold(p))
            .filter(|p| !p.is_empty())
            .any(|p| ip_region.contains(&p) || delivery_province.contains(&p));
        if is_far {
            SubScore::new(points.far_province, detail)
        } else {
            SubScore::new(points.different_province, detail)
        }
    }

    /// Same-IP orders placed today, with a higher score when they are bunched inside the repetition window.
    pub fn repetition_score(&self, ip: &str, row: usize, index: &IpIndex, now: DateTime<Utc>) -> SubScore {
        let analysis = &self.config.analysis;
        let points = &self.config.points;
        let today = start_of_day(now, analysis.timezone);
        let mut same_day = 0;
        let mut in_window = 0;
        for sighting in index.others(ip, row) {
            let Some(date) = sighting.order_date else { continue };
            if date >= today {
                same_day += 1;
                if now - date <= analysis.repeat_window {
                    in_window += 1;
                }
            }
        }
        trace!("🛡️ {ip}: {same_day} other orders today, {in_window} inside the repetition window");
        if in_window >= 2 {
            let window = format_window(analysis.repeat_window);
            SubScore::new(points.repeated_in_window, format!("{} pedidos con misma IP en {window}", in_window + 1))
        } else if same_day >= 2 {
            SubScore::new(points.repeated_same_day, format!("{} pedidos con misma IP hoy", same_day + 1))
        } else if same_day == 1 {
            SubScore::new(points.repeated_once, "IP repetida hoy")
        } else {
            SubScore::zero()
        }
    }

    /// Distinct delivery addresses used with the same IP, the current order's address included.
    pub fn address_score(&self, ip: &str, address: &str, row: usize, index: &IpIndex) -> SubScore {
        let points = &self.config.points;
        let mut addresses = HashSet::from([address]);
        addresses.extend(index.others(ip, row).map(|s| s.address.as_str()).filter(|a| !a.is_empty()));
        let count = addresses.len();
        if count >= self.config.analysis.max_addresses_per_ip {
            SubScore::new(points.max_addresses, format!("IP usada en {count} direcciones diferentes"))
        } else if count == 3 {
            SubScore::new(points.three_addresses, "IP usada en 3 direcciones diferentes")
        } else if count == 2 {
            SubScore::new(points.two_addresses, "IP usada en 2 direcciones diferentes")
        } else {
            SubScore::zero()
        }
    }

    /// Bonus for IPs that keep coming back over the long lookback window.
    pub fn history_score(&self, ip: &str, row: usize, index: &IpIndex, now: DateTime<Utc>) -> SubScore {
        let history = &self.config.history;
        let since = now - chrono::Duration::days(i64::from(history.lookback_days));
        let total = index.others(ip, row).filter(|s| s.order_date.is_some_and(|d| d >= since)).count();
        if total >= history.repeat_threshold {
            SubScore::new(
                history.bonus_points,
                format!("{total} pedidos con misma IP en {} días", history.lookback_days),
            )
        } else {
            SubScore::zero()
        }
    }
}

impl<C, L> FraudScorer<C, L>
where
    C: KeyValueCache,
    L: GeoLocator,
{
    pub async fn geolocation_score(&self, ip: &str, province: &str, city: &str) -> SubScore {
        match self.geo.lookup(ip).await {
            Ok(result) => self.geolocation_points(&result, province, city),
            Err(e) => {
                warn!("🛡️ Could not geolocate {ip}. The geolocation sub-score is 0. {e}");
                SubScore::new(0, GEO_ERROR_DETAIL)
            },
        }
    }

    /// Scores ledger row `row` using a prebuilt index of the whole ledger.
    pub async fn score_at(&self, row: usize, index: &IpIndex, mode: ScoringMode, now: DateTime<Utc>) -> RiskAssessment {
        let Some(record) = index.record(row).filter(|r| r.is_scorable()) else {
            debug!("🛡️ Row {row} is missing its IP or province. Skipping the sub-scores.");
            return RiskAssessment::no_data();
        };
        let ip = record.ip.as_deref().unwrap_or_default();
        let province = record.provincia.as_deref().unwrap_or_default();
        let city = record.ciudad.as_deref().unwrap_or_default();
        let mut parts = vec![
            self.geolocation_score(ip, province, city).await,
            self.repetition_score(ip, row, index, now),
            self.address_score(ip, &record.direccion_completa(), row, index),
        ];
        if mode == ScoringMode::WithHistory {
            parts.push(self.history_score(ip, row, index, now));
        }
        let score = parts.iter().map(|p| p.points).sum();
        let band = self.config.thresholds.classify(score);
        let details = join_details(parts.iter().map(|p| p.detail.as_str()));
        debug!("🛡️ Row {row} ({ip}) scored {score}: {band}. {details}");
        RiskAssessment::new(score, band, details)
    }

    /// Scores one order of `orders` as of now. Builds a fresh index, so prefer [`Self::score_at`] in loops.
    pub async fn score(&self, row: usize, orders: &[Order], mode: ScoringMode) -> RiskAssessment {
        let index = IpIndex::build(orders);
        self.score_at(row, &index, mode, Utc::now()).await
    }
}
