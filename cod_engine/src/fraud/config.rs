//! Scoring weights, band thresholds, analysis windows and the province table used by the fraud scorer.
//!
//! Every value has a default and the whole [`FraudConfig`] is immutable once handed to a scorer.
use std::{collections::HashMap, time::Duration};

use chrono_tz::Tz;
use cod_common::strip_accents;
use thiserror::Error;

use crate::fraud::RiskBand;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Band thresholds must increase: CONFIABLE ≤ {trusted_max} must be below REVISAR ≤ {review_max}")]
    UnorderedThresholds { trusted_max: u32, review_max: u32 },
    #[error("The maximum number of addresses per IP must be at least 2, not {0}")]
    AddressCapTooSmall(usize),
    #[error("The history lookback must be at least one day")]
    ZeroLookback,
    #[error("The history repetition threshold must be at least 1")]
    ZeroRepeatThreshold,
    #[error("The repetition window must be positive")]
    EmptyRepeatWindow,
}

/// Points awarded by each sub-score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePoints {
    pub ip_not_locatable: u32,
    pub foreign_ip: u32,
    pub far_province: u32,
    pub different_province: u32,
    pub repeated_in_window: u32,
    pub repeated_same_day: u32,
    pub repeated_once: u32,
    pub max_addresses: u32,
    pub three_addresses: u32,
    pub two_addresses: u32,
}

impl Default for ScorePoints {
    fn default() -> Self {
        Self {
            ip_not_locatable: 1,
            foreign_ip: 4,
            far_province: 3,
            different_province: 2,
            repeated_in_window: 3,
            repeated_same_day: 2,
            repeated_once: 1,
            max_addresses: 3,
            three_addresses: 2,
            two_addresses: 1,
        }
    }
}

/// Inclusive upper bounds of the two lower risk bands. Anything above `review_max` is suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskThresholds {
    pub trusted_max: u32,
    pub review_max: u32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { trusted_max: 2, review_max: 5 }
    }
}

impl RiskThresholds {
    pub fn classify(&self, score: u32) -> RiskBand {
        if score <= self.trusted_max {
            RiskBand::Trusted
        } else if score <= self.review_max {
            RiskBand::Review
        } else {
            RiskBand::Suspicious
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Same-IP orders closer together than this score higher than same-day repeats
    pub repeat_window: chrono::Duration,
    pub max_addresses_per_ip: usize,
    /// Delay inserted after each scored order, to stay under the geolocation service's rate limit
    pub lookup_pause: Duration,
    /// Island and exclave territories. Lower-case, accent-free.
    pub far_provinces: Vec<String>,
    /// The zone in which "today" is computed
    pub timezone: Tz,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            repeat_window: chrono::Duration::hours(2),
            max_addresses_per_ip: 4,
            lookup_pause: Duration::from_millis(100),
            far_provinces: ["canarias", "baleares", "ceuta", "melilla"].into_iter().map(String::from).collect(),
            timezone: chrono_tz::Europe::Madrid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    pub lookback_days: u32,
    pub repeat_threshold: usize,
    pub bonus_points: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { lookback_days: 30, repeat_threshold: 3, bonus_points: 2 }
    }
}

const PROVINCES: [(&str, &str); 50] = [
    ("A", "alicante"),
    ("AB", "albacete"),
    ("AL", "almería"),
    ("AV", "ávila"),
    ("B", "barcelona"),
    ("BA", "badajoz"),
    ("BI", "bizkaia"),
    ("BU", "burgos"),
    ("C", "coruña"),
    ("CA", "cádiz"),
    ("CC", "cáceres"),
    ("CO", "córdoba"),
    ("CR", "ciudad real"),
    ("CS", "castellón"),
    ("CU", "cuenca"),
    ("GC", "las palmas"),
    ("GI", "girona"),
    ("GR", "granada"),
    ("GU", "guadalajara"),
    ("H", "huelva"),
    ("HU", "huesca"),
    ("J", "jaén"),
    ("L", "lleida"),
    ("LE", "león"),
    ("LO", "la rioja"),
    ("LU", "lugo"),
    ("M", "madrid"),
    ("MA", "málaga"),
    ("MU", "murcia"),
    ("NA", "navarra"),
    ("O", "asturias"),
    ("OR", "ourense"),
    ("P", "palencia"),
    ("PM", "baleares"),
    ("PO", "pontevedra"),
    ("S", "cantabria"),
    ("SA", "salamanca"),
    ("SE", "sevilla"),
    ("SG", "segovia"),
    ("SO", "soria"),
    ("SS", "gipuzkoa"),
    ("T", "tarragona"),
    ("TE", "teruel"),
    ("TF", "santa cruz de tenerife"),
    ("TO", "toledo"),
    ("V", "valencia"),
    ("VA", "valladolid"),
    ("VI", "araba"),
    ("Z", "zaragoza"),
    ("ZA", "zamora"),
];

/// Province code (as written in the order metadata) to province name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceTable {
    names: HashMap<String, String>,
}

impl Default for ProvinceTable {
    fn default() -> Self {
        Self { names: PROVINCES.iter().map(|(code, name)| (code.to_string(), name.to_string())).collect() }
    }
}

impl ProvinceTable {
    /// The province name for `code`, or `code` itself when it is not a known code. The result is lower-cased and
    /// accent-free so that it can be compared with geolocation output.
    pub fn resolve(&self, code: &str) -> String {
        let code = code.trim();
        let name = self.names.get(code).map(String::as_str).unwrap_or(code);
        strip_accents(&name.to_lowercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FraudConfig {
    pub points: ScorePoints,
    pub thresholds: RiskThresholds,
    pub analysis: AnalysisConfig,
    pub history: HistoryConfig,
    pub provinces: ProvinceTable,
}

impl FraudConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let RiskThresholds { trusted_max, review_max } = self.thresholds;
        if trusted_max >= review_max {
            return Err(ConfigError::UnorderedThresholds { trusted_max, review_max });
        }
        if self.analysis.max_addresses_per_ip < 2 {
            return Err(ConfigError::AddressCapTooSmall(self.analysis.max_addresses_per_ip));
        }
        if self.analysis.repeat_window <= chrono::Duration::zero() {
            return Err(ConfigError::EmptyRepeatWindow);
        }
        if self.history.lookback_days == 0 {
            return Err(ConfigError::ZeroLookback);
        }
        if self.history.repeat_threshold == 0 {
            return Err(ConfigError::ZeroRepeatThreshold);
        }
        Ok(())
    }
}
