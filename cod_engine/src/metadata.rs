//! Parser for the free-text block that the shop attaches to every order.
//!
//! The block is line oriented, e.g.
//!
//! ```text
//! Nombre: Lucía Pérez
//! Dirección (calle y número): Calle Mayor 5
//! Ciudad: Getafe
//! Provincia: M
//! Código postal: 28901
//! IP address: 83.45.12.9
//! ```
//!
//! Labels are matched literally anywhere on the line, in a fixed order of precedence. Lines without a known label are
//! ignored and nothing here ever fails: missing fields are simply absent.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Province,
    City,
    Ip,
    Address,
    PostalCode,
}

const NAME_LABEL: &str = "Nombre:";
const PROVINCE_LABEL: &str = "Provincia:";
const CITY_LABEL: &str = "Ciudad:";
const IP_LABEL: &str = "IP address:";
const ADDRESS_LABEL: &str = "Dirección";
const POSTAL_CODE_LABEL: &str = "Código postal:";

/// The typed view of an order's metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub nombre: Option<String>,
    pub provincia: Option<String>,
    pub ciudad: Option<String>,
    pub ip: Option<String>,
    pub direccion: Option<String>,
    pub codigo_postal: Option<String>,
}

impl MetadataRecord {
    pub fn extract(raw: &str) -> Self {
        let mut record = Self::default();
        for line in raw.lines() {
            let line = line.trim();
            if let Some((field, value)) = classify(line) {
                let value = Some(value.trim()).filter(|v| !v.is_empty()).map(String::from);
                match field {
                    Field::Name => record.nombre = value,
                    Field::Province => record.provincia = value,
                    Field::City => record.ciudad = value,
                    Field::Ip => record.ip = value,
                    Field::Address => record.direccion = value,
                    Field::PostalCode => record.codigo_postal = value,
                }
            }
        }
        record
    }

    pub fn has_ip(&self) -> bool {
        self.ip.is_some()
    }

    pub fn has_provincia(&self) -> bool {
        self.provincia.is_some()
    }

    /// True when both the IP and the delivery province are present, which is the minimum needed to score an order.
    pub fn is_scorable(&self) -> bool {
        self.has_ip() && self.has_provincia()
    }

    /// Address, city and province joined by spaces, trimmed and lower-cased. Only ever compared for equality.
    pub fn direccion_completa(&self) -> String {
        let parts = [&self.direccion, &self.ciudad, &self.provincia];
        parts.iter().map(|p| p.as_deref().unwrap_or_default()).collect::<Vec<_>>().join(" ").trim().to_lowercase()
    }
}

fn classify(line: &str) -> Option<(Field, &str)> {
    let simple = [
        (NAME_LABEL, Field::Name),
        (PROVINCE_LABEL, Field::Province),
        (CITY_LABEL, Field::City),
        (IP_LABEL, Field::Ip),
    ];
    for (label, field) in simple {
        if let Some((_, value)) = line.split_once(label) {
            return Some((field, value));
        }
    }
    if line.contains(ADDRESS_LABEL) {
        // "Dirección (calle y número): ..." puts the value after the closing parenthesis
        let value = match line.split_once("):") {
            Some((_, v)) => v,
            None => line.split_once(':').map(|(_, v)| v).unwrap_or_default(),
        };
        return Some((Field::Address, value));
    }
    line.split_once(POSTAL_CODE_LABEL).map(|(_, value)| (Field::PostalCode, value))
}
