use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

//--------------------------------------     OrderId       ---------------------------------------------------------
/// The identifier an order carries in every status source (ledger, worksheet and external feed).
/// Ids are trimmed on the way in, including when read from a stored ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   CanonicalStatus     ---------------------------------------------------------
/// The ledger's status vocabulary. The serialized forms are the exact strings the ledger stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalStatus {
    #[serde(rename = "En tránsito")]
    InTransit,
    #[serde(rename = "INCIDENCIA")]
    Incident,
    #[serde(rename = "Entregado")]
    Delivered,
    /// Delivered after an incident. Only reachable from [`CanonicalStatus::Incident`].
    #[serde(rename = "I. ENTREGADO")]
    DeliveredAfterIncident,
    #[serde(rename = "Devolucion")]
    Returned,
    /// Set by a human when the carrier failed. Never overridden automatically.
    #[serde(rename = "FALLO AGENCIA")]
    CarrierFailure,
    /// Set by a human when the customer never confirmed. Never overridden automatically.
    #[serde(rename = "NO CONFIRMADO")]
    NotConfirmed,
}

/// How an order with no status is shown in reports and change logs.
pub const NO_STATUS: &str = "Sin estado";

impl CanonicalStatus {
    pub const ALL: [CanonicalStatus; 7] = [
        CanonicalStatus::InTransit,
        CanonicalStatus::Incident,
        CanonicalStatus::Delivered,
        CanonicalStatus::DeliveredAfterIncident,
        CanonicalStatus::Returned,
        CanonicalStatus::CarrierFailure,
        CanonicalStatus::NotConfirmed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStatus::InTransit => "En tránsito",
            CanonicalStatus::Incident => "INCIDENCIA",
            CanonicalStatus::Delivered => "Entregado",
            CanonicalStatus::DeliveredAfterIncident => "I. ENTREGADO",
            CanonicalStatus::Returned => "Devolucion",
            CanonicalStatus::CarrierFailure => "FALLO AGENCIA",
            CanonicalStatus::NotConfirmed => "NO CONFIRMADO",
        }
    }

    /// Sinks of the workflow. Reconciliation never moves an order out of one of these.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CanonicalStatus::InTransit | CanonicalStatus::Incident)
    }

    /// Terminal statuses that only a human sets.
    pub fn is_manual_hold(&self) -> bool {
        matches!(self, CanonicalStatus::CarrierFailure | CanonicalStatus::NotConfirmed)
    }

    /// Orders in these statuses can still be moved by a feed sync.
    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }

    /// Displays an optional ledger status, using [`NO_STATUS`] for blanks.
    pub fn display_optional(status: Option<CanonicalStatus>) -> &'static str {
        status.map(|s| s.as_str()).unwrap_or(NO_STATUS)
    }
}

impl Display for CanonicalStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalStatus {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CanonicalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ConversionError(s.to_string()))
    }
}

/// Ledger cells are free text, so a blank status cell means the order has no status yet.
fn blank_as_no_status<'de, D>(deserializer: D) -> Result<Option<CanonicalStatus>, D::Error>
where D: Deserializer<'de> {
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

//--------------------------------------  ConfirmationStatus   ---------------------------------------------------------
/// Who confirmed the order with the customer, or `NO VALIDO` if it was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConfirmationStatus {
    Direct,
    Wac,
    Cc,
    Shopify,
    NoValido,
    Other(String),
}

impl ConfirmationStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Direct | Self::Wac | Self::Cc | Self::Shopify)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::NoValido)
    }
}

impl From<String> for ConfirmationStatus {
    fn from(value: String) -> Self {
        match value.trim() {
            "DIRECT" => Self::Direct,
            "WAC" => Self::Wac,
            "CC" => Self::Cc,
            "SHOPIFY" => Self::Shopify,
            "NO VALIDO" => Self::NoValido,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<ConfirmationStatus> for String {
    fn from(value: ConfirmationStatus) -> Self {
        value.to_string()
    }
}

impl Display for ConfirmationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => f.write_str("DIRECT"),
            Self::Wac => f.write_str("WAC"),
            Self::Cc => f.write_str("CC"),
            Self::Shopify => f.write_str("SHOPIFY"),
            Self::NoValido => f.write_str("NO VALIDO"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
/// One row of the order ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub external_id: OrderId,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub confirmation: Option<ConfirmationStatus>,
    #[serde(default, deserialize_with = "blank_as_no_status")]
    pub current_status: Option<CanonicalStatus>,
    /// Stored ledger column, carried through on save. Scoring and stats always read the IP from `raw_metadata`.
    #[serde(default)]
    pub ip: Option<String>,
    /// The free-text block the shop attaches to the order
    #[serde(default)]
    pub raw_metadata: Option<String>,
    /// Written by the fraud scanner, e.g. `"⚠️ REVISAR (4)"`
    #[serde(default)]
    pub risk_label: Option<String>,
}

impl Order {
    pub fn new<S: Into<OrderId>>(external_id: S) -> Self {
        Self {
            external_id: external_id.into(),
            order_date: None,
            customer_name: String::default(),
            phone: String::default(),
            confirmation: None,
            current_status: None,
            ip: None,
            raw_metadata: None,
            risk_label: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.order_date = Some(date);
        self
    }

    pub fn with_customer<S: Into<String>>(mut self, name: S) -> Self {
        self.customer_name = name.into();
        self
    }

    pub fn with_status(mut self, status: CanonicalStatus) -> Self {
        self.current_status = Some(status);
        self
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationStatus) -> Self {
        self.confirmation = Some(confirmation);
        self
    }

    pub fn with_metadata<S: Into<String>>(mut self, raw: S) -> Self {
        self.raw_metadata = Some(raw.into());
        self
    }

    pub fn with_risk_label<S: Into<String>>(mut self, label: S) -> Self {
        self.risk_label = Some(label.into());
        self
    }

    /// The metadata blob, if it contains anything other than whitespace.
    pub fn metadata(&self) -> Option<&str> {
        self.raw_metadata.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn has_risk_label(&self) -> bool {
        self.risk_label.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

//--------------------------------------    StatusSource     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusSource {
    /// The manually imported worksheet
    Worksheet,
    /// The paginated order-tracking feed
    ExternalFeed,
}

impl Display for StatusSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusSource::Worksheet => f.write_str("Worksheet"),
            StatusSource::ExternalFeed => f.write_str("Dropea"),
        }
    }
}

//--------------------------------------    StatusUpdate     ---------------------------------------------------------
/// A normalized status signal, ready to be reconciled against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub external_id: OrderId,
    pub reported: CanonicalStatus,
    pub source: StatusSource,
    /// The status exactly as the source reported it
    pub source_status: String,
    pub tracking_ref: Option<String>,
}

impl StatusUpdate {
    pub fn new<S: Into<OrderId>>(external_id: S, reported: CanonicalStatus, source: StatusSource) -> Self {
        Self {
            external_id: external_id.into(),
            reported,
            source,
            source_status: reported.to_string(),
            tracking_ref: None,
        }
    }

    pub fn with_source_status<S: Into<String>>(mut self, status: S) -> Self {
        self.source_status = status.into();
        self
    }

    pub fn with_tracking_ref<S: Into<String>>(mut self, tracking: S) -> Self {
        self.tracking_ref = Some(tracking.into());
        self
    }
}

//--------------------------------------    ChangeRecord     ---------------------------------------------------------
/// A status transition that reconciliation applied to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub external_id: OrderId,
    /// Index of the ledger row that changed
    pub row: usize,
    pub order_date: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub prior: Option<CanonicalStatus>,
    pub new: CanonicalStatus,
    pub timestamp: DateTime<Utc>,
    pub tracking_ref: Option<String>,
    pub source: StatusSource,
    pub source_status: String,
}

impl Display for ChangeRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} → {}",
            self.external_id,
            self.source,
            CanonicalStatus::display_optional(self.prior),
            self.new
        )
    }
}
