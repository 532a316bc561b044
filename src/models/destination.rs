//! Destination records returned by the search index

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::normalize::{
    SCORE_MIDPOINT, UNNAMED_DESTINATION, flag, identifier, nested, non_negative, number_or,
    object_list, score_or, string_list, text, text_or,
};

/// Attributes requested from the index for a full destination search
pub const DESTINATION_ATTRIBUTES: &[&str] = &[
    "name",
    "country",
    "region",
    "continent",
    "category",
    "sustainability_score",
    "carbon_footprint_score",
    "green_offset_tip",
    "activities",
    "best_season",
    "price_tier",
    "price_range_usd",
    "description",
    "transport_options",
    "accommodations",
    "sustainability_features",
    "family_friendly",
    "image_url",
    "featured",
];

/// Highest green rating an accommodation can carry
pub const MAX_GREEN_RATING: u8 = 5;

/// A travel destination with its sustainability metadata.
///
/// Values are always fully defaulted: decoding goes through the lenient
/// accessors in [`crate::normalize`], so a sparse or malformed hit still
/// produces a renderable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Destination {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub name: String,
    pub country: String,
    pub region: String,
    pub continent: String,
    pub category: String,
    /// 0-10, higher is better
    pub sustainability_score: f64,
    /// 0-10, lower is better
    pub carbon_footprint_score: f64,
    pub green_offset_tip: String,
    pub activities: Vec<String>,
    pub best_season: String,
    pub price_tier: String,
    pub price_range_usd: PriceRange,
    pub description: String,
    pub transport_options: Vec<TransportOption>,
    pub accommodations: Vec<Accommodation>,
    pub sustainability_features: Vec<String>,
    pub family_friendly: bool,
    pub image_url: String,
    pub featured: bool,
}

/// Nightly price range in USD
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportOption {
    pub mode: TransportMode,
    pub carbon_kg_per_1000km: f64,
    pub comfort: String,
    pub scenic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accommodation {
    #[serde(rename = "type")]
    pub kind: String,
    /// 0..=5, rendered as repeated leaf marks
    pub green_rating: u8,
    pub description: String,
}

/// Mode of travel. Unknown modes from the index are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Train,
    Bus,
    ElectricCar,
    HybridCar,
    EconomyFlight,
    Bicycle,
    Ferry,
    Sailing,
    Other(String),
}

impl TransportMode {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "train" => Self::Train,
            "bus" => Self::Bus,
            "electric_car" => Self::ElectricCar,
            "hybrid_car" => Self::HybridCar,
            "economy_flight" => Self::EconomyFlight,
            "bicycle" => Self::Bicycle,
            "ferry" => Self::Ferry,
            "sailing" => Self::Sailing,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Identifier as stored in the index
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Train => "train",
            Self::Bus => "bus",
            Self::ElectricCar => "electric_car",
            Self::HybridCar => "hybrid_car",
            Self::EconomyFlight => "economy_flight",
            Self::Bicycle => "bicycle",
            Self::Ferry => "ferry",
            Self::Sailing => "sailing",
            Self::Other(raw) => raw,
        }
    }

    /// Human readable label, e.g. "electric car"
    #[must_use]
    pub fn label(&self) -> String {
        match self.as_str() {
            "" => "unknown".to_string(),
            raw => raw.replace('_', " "),
        }
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Train => "🚆",
            Self::Bus => "🚌",
            Self::ElectricCar => "⚡🚗",
            Self::HybridCar => "🚗",
            Self::EconomyFlight => "✈️",
            Self::Bicycle => "🚲",
            Self::Ferry => "⛴️",
            Self::Sailing => "⛵",
            Self::Other(_) => "🚀",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for TransportMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<Value> for Destination {
    fn from(hit: Value) -> Self {
        Self::from_hit(&hit)
    }
}

impl Destination {
    /// Build a fully defaulted destination from a raw search hit. The hit is
    /// only read, never modified.
    #[must_use]
    pub fn from_hit(hit: &Value) -> Self {
        let price = nested(hit, "price_range_usd");
        Self {
            object_id: identifier(hit, "objectID"),
            name: text_or(hit, "name", UNNAMED_DESTINATION),
            country: text(hit, "country"),
            region: text(hit, "region"),
            continent: text(hit, "continent"),
            category: text(hit, "category"),
            sustainability_score: score_or(hit, "sustainability_score", 0.0),
            carbon_footprint_score: score_or(hit, "carbon_footprint_score", SCORE_MIDPOINT),
            green_offset_tip: text(hit, "green_offset_tip"),
            activities: string_list(hit, "activities"),
            best_season: text(hit, "best_season"),
            price_tier: text(hit, "price_tier"),
            price_range_usd: PriceRange {
                min: number_or(price, "min", 0.0),
                max: number_or(price, "max", 0.0),
            },
            description: text(hit, "description"),
            transport_options: object_list(hit, "transport_options")
                .into_iter()
                .map(TransportOption::from_hit)
                .collect(),
            accommodations: object_list(hit, "accommodations")
                .into_iter()
                .map(Accommodation::from_hit)
                .collect(),
            sustainability_features: string_list(hit, "sustainability_features"),
            family_friendly: flag(hit, "family_friendly"),
            image_url: text(hit, "image_url"),
            featured: flag(hit, "featured"),
        }
    }

    /// "Region, Country" with empty parts left out
    #[must_use]
    pub fn location(&self) -> String {
        [self.region.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Transport options sorted ascending by carbon cost. The sort is stable,
    /// so equal costs keep their index order.
    #[must_use]
    pub fn transport_by_carbon(&self) -> Vec<&TransportOption> {
        let mut sorted: Vec<&TransportOption> = self.transport_options.iter().collect();
        sorted.sort_by(|a, b| a.carbon_kg_per_1000km.total_cmp(&b.carbon_kg_per_1000km));
        sorted
    }
}

impl TransportOption {
    #[must_use]
    pub fn from_hit(hit: &Value) -> Self {
        Self {
            mode: TransportMode::parse(&text(hit, "mode")),
            carbon_kg_per_1000km: non_negative(hit, "carbon_kg_per_1000km"),
            comfort: text(hit, "comfort"),
            scenic: flag(hit, "scenic"),
        }
    }
}

impl Accommodation {
    #[must_use]
    pub fn from_hit(hit: &Value) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let green_rating = number_or(hit, "green_rating", 0.0)
            .round()
            .clamp(0.0, f64::from(MAX_GREEN_RATING)) as u8;
        Self {
            kind: text(hit, "type"),
            green_rating,
            description: text(hit, "description"),
        }
    }
}
