//! # Fraud risk scoring
//!
//! Orders are scored from the metadata block the shop attaches to them. The total score is the sum of independent
//! sub-scores:
//!
//! * geolocation of the order IP against the declared delivery province and city, 0 to 4 points,
//! * same-IP repetition today and inside a short recency window, 0 to 3 points,
//! * distinct delivery addresses seen under the same IP, 0 to 3 points,
//! * optionally, a bonus for IPs that recur over a long lookback window ([`ScoringMode::WithHistory`]).
//!
//! The total is classified into a [`RiskBand`] and written back to the ledger as a label such as `"⚠️ REVISAR (4)"`.
//! Orders without an IP or a delivery province are labelled `"❓ SIN DATOS"` with a score of 0.
mod api;
mod config;
mod index;
mod objects;
mod scorer;

pub use api::{FraudScanError, FraudScoringApi};
pub use config::{AnalysisConfig, ConfigError, FraudConfig, HistoryConfig, ProvinceTable, RiskThresholds, ScorePoints};
pub use index::{IpIndex, Sighting};
pub use objects::{
    join_details,
    RiskAssessment,
    RiskBand,
    ScanSummary,
    ScoringMode,
    SubScore,
    DETAIL_SEPARATOR,
    NO_DATA_DETAIL,
    NO_DATA_LABEL,
};
pub use scorer::{start_of_day, FraudScorer, GEO_ERROR_DETAIL};
