use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business taxonomy for a point of sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PosType {
    Cafe,
    Bakery,
    VendingMachine,
    Cafeteria,
}

impl PosType {
    pub const fn label(self) -> &'static str {
        match self {
            PosType::Cafe => "cafe",
            PosType::Bakery => "bakery",
            PosType::VendingMachine => "vending_machine",
            PosType::Cafeteria => "cafeteria",
        }
    }
}

/// Campus zone a POS is assigned to. Zones only subdivide Heidelberg;
/// out-of-area entries fall back to Altstadt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampusType {
    Altstadt,
    Bergheim,
    Inf,
}

impl CampusType {
    pub const fn label(self) -> &'static str {
        match self {
            CampusType::Altstadt => "altstadt",
            CampusType::Bergheim => "bergheim",
            CampusType::Inf => "inf",
        }
    }
}

/// A catalog point of sale.
///
/// `id` and the timestamps are assigned by the repository; a candidate
/// fresh out of conversion carries neither. An absent `id` selects the
/// create path on upsert. The address fields are all-or-nothing: no POS
/// with a partial address ever exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub pos_type: PosType,
    pub campus: CampusType,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
