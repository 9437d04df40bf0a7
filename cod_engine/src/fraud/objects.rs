use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub const NO_DATA_LABEL: &str = "❓ SIN DATOS";
pub const NO_DATA_DETAIL: &str = "Faltan datos para análisis";
pub const DETAIL_SEPARATOR: &str = " | ";

//--------------------------------------      RiskBand       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Trusted,
    Review,
    Suspicious,
}

impl RiskBand {
    pub const ALL: [RiskBand; 3] = [RiskBand::Trusted, RiskBand::Review, RiskBand::Suspicious];

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Trusted => "✅ CONFIABLE",
            RiskBand::Review => "⚠️ REVISAR",
            RiskBand::Suspicious => "🚨 SOSPECHOSO",
        }
    }

    /// Recognises the band a previously written risk label belongs to.
    pub fn from_label(label: &str) -> Option<Self> {
        RiskBand::ALL.into_iter().find(|band| label.contains(band.label()))
    }
}

impl Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

//--------------------------------------      SubScore       ---------------------------------------------------------
/// The contribution of one heuristic to the total score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubScore {
    pub points: u32,
    pub detail: String,
}

impl SubScore {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new<S: Into<String>>(points: u32, detail: S) -> Self {
        Self { points, detail: detail.into() }
    }
}

//--------------------------------------   RiskAssessment    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    /// `None` when the order lacked the data needed to score it
    pub band: Option<RiskBand>,
    /// The text written to the ledger, e.g. `"⚠️ REVISAR (4)"`
    pub label: String,
    pub details: String,
}

impl RiskAssessment {
    pub fn no_data() -> Self {
        Self { score: 0, band: None, label: NO_DATA_LABEL.to_string(), details: NO_DATA_DETAIL.to_string() }
    }

    pub fn new(score: u32, band: RiskBand, details: String) -> Self {
        Self { score, band: Some(band), label: format!("{} ({score})", band.label()), details }
    }

    pub fn is_suspicious(&self) -> bool {
        self.band == Some(RiskBand::Suspicious)
    }
}

pub fn join_details<'a, I: IntoIterator<Item = &'a str>>(details: I) -> String {
    details.into_iter().filter(|d| !d.is_empty()).collect::<Vec<_>>().join(DETAIL_SEPARATOR)
}

//--------------------------------------   ScoringMode       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringMode {
    /// Geolocation, same-IP repetition and multi-address sub-scores
    #[default]
    Standard,
    /// The standard score plus the long lookback same-IP bonus
    WithHistory,
}

impl Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMode::Standard => f.write_str("standard"),
            ScoringMode::WithHistory => f.write_str("with history"),
        }
    }
}

//--------------------------------------   ScanSummary       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub processed: usize,
    pub suspicious: usize,
    pub mode: ScoringMode,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(RiskAssessment::new(4, RiskBand::Review, String::new()).label, "⚠️ REVISAR (4)");
        assert_eq!(RiskAssessment::no_data().label, "❓ SIN DATOS");
        assert_eq!(RiskBand::from_label("🚨 SOSPECHOSO (7)"), Some(RiskBand::Suspicious));
        assert_eq!(RiskBand::from_label("❓ SIN DATOS"), None);
    }

    #[test]
    fn details_skip_empty_parts() {
        assert_eq!(join_details(["IP no localizable", "", "IP repetida hoy"]), "IP no localizable | IP repetida hoy");
        assert_eq!(join_details(Vec::<&str>::new()), "");
    }
}
