//! Presentation of destinations and conversation turns
//!
//! View models here are shared by the HTTP API (serialized as JSON for a
//! front end) and the terminal renderer. Each destination is rendered on its
//! own: a fault while rendering one card yields a placeholder for that card
//! and leaves its siblings untouched.

use serde::Serialize;
use std::fmt::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

use crate::models::{Destination, TransportOption, Turn};

/// Cards shown under one assistant turn
pub const MAX_CARDS_PER_TURN: usize = 4;
/// Activities shown on a collapsed card
pub const MAX_CARD_ACTIVITIES: usize = 3;

pub const NO_TRANSPORT_DATA: &str = "No transport data available";
pub const CARD_UNAVAILABLE: &str = "This destination could not be displayed.";

const BAR_CELLS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Favorable,
    Neutral,
    Unfavorable,
}

impl Tone {
    /// Tone of a 0-10 carbon score, lower is better
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score <= 3.0 {
            Self::Favorable
        } else if score <= 6.0 {
            Self::Neutral
        } else {
            Self::Unfavorable
        }
    }

    /// Tone of a transport option by kg CO2 per 1000 km
    #[must_use]
    pub fn for_emissions(kg: f64) -> Self {
        if kg < 30.0 {
            Self::Favorable
        } else if kg < 100.0 {
            Self::Neutral
        } else {
            Self::Unfavorable
        }
    }
}

/// Score shown as a proportional bar; a low score fills more of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarbonMeter {
    pub label: String,
    pub score: f64,
    /// Fill fraction in 0..=1
    pub fill: f64,
    pub tone: Tone,
}

impl CarbonMeter {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
            fill: ((10.0 - score) / 10.0).clamp(0.0, 1.0),
            tone: Tone::for_score(score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportBar {
    pub mode: String,
    pub label: String,
    pub icon: &'static str,
    pub carbon_kg_per_1000km: f64,
    /// Width relative to the most emitting option, 0..=1
    pub width: f64,
    pub tone: Tone,
}

/// Transport options sorted ascending by emissions, each sized relative to
/// the largest value. A zero maximum gives zero-width bars.
#[must_use]
pub fn transport_comparison(options: &[TransportOption]) -> Vec<TransportBar> {
    let mut sorted: Vec<&TransportOption> = options.iter().collect();
    sorted.sort_by(|a, b| a.carbon_kg_per_1000km.total_cmp(&b.carbon_kg_per_1000km));

    let max = sorted
        .iter()
        .map(|o| o.carbon_kg_per_1000km)
        .fold(0.0_f64, f64::max);

    sorted
        .into_iter()
        .map(|option| TransportBar {
            mode: option.mode.as_str().to_string(),
            label: option.mode.label(),
            icon: option.mode.icon(),
            carbon_kg_per_1000km: option.carbon_kg_per_1000km,
            width: if max > 0.0 {
                option.carbon_kg_per_1000km / max
            } else {
                0.0
            },
            tone: Tone::for_emissions(option.carbon_kg_per_1000km),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccommodationView {
    pub kind: String,
    /// Green rating as repeated leaf marks
    pub leaves: String,
    pub description: String,
}

/// Everything a destination card shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub sustainability_score: f64,
    pub carbon: CarbonMeter,
    pub activities: Vec<String>,
    pub season: String,
    pub price: String,
    pub family_friendly: bool,
    pub image_url: String,
    pub transport: Vec<TransportBar>,
    pub green_features: Vec<String>,
    pub green_tip: String,
    pub accommodations: Vec<AccommodationView>,
}

impl CardView {
    #[must_use]
    pub fn new(dest: &Destination) -> Self {
        let price = if dest.price_tier.is_empty() {
            format!("${}-${}/night", dest.price_range_usd.min, dest.price_range_usd.max)
        } else {
            format!(
                "{} · ${}-${}/night",
                dest.price_tier, dest.price_range_usd.min, dest.price_range_usd.max
            )
        };

        Self {
            id: dest.object_id.clone(),
            name: dest.name.clone(),
            location: dest.location(),
            sustainability_score: dest.sustainability_score,
            carbon: CarbonMeter::new("Carbon", dest.carbon_footprint_score),
            activities: dest
                .activities
                .iter()
                .take(MAX_CARD_ACTIVITIES)
                .cloned()
                .collect(),
            season: dest.best_season.clone(),
            price,
            family_friendly: dest.family_friendly,
            image_url: dest.image_url.clone(),
            transport: transport_comparison(&dest.transport_options),
            green_features: dest.sustainability_features.clone(),
            green_tip: dest.green_offset_tip.clone(),
            accommodations: dest
                .accommodations
                .iter()
                .map(|acc| AccommodationView {
                    kind: acc.kind.clone(),
                    leaves: "🌿".repeat(usize::from(acc.green_rating)),
                    description: acc.description.clone(),
                })
                .collect(),
        }
    }
}

/// Result of rendering one item in isolation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Rendered<T> {
    Ok { view: T },
    Unavailable { id: String, message: String },
}

/// Render every item independently. Errors and panics are contained to the
/// item that caused them, which is replaced by a placeholder.
pub fn render_each<T, R, E, F>(items: &[T], id: impl Fn(&T) -> String, render: F) -> Vec<Rendered<R>>
where
    F: Fn(&T) -> Result<R, E>,
    E: fmt::Display,
{
    items
        .iter()
        .map(|item| {
            let failure = match panic::catch_unwind(AssertUnwindSafe(|| render(item))) {
                Ok(Ok(view)) => return Rendered::Ok { view },
                Ok(Err(e)) => e.to_string(),
                Err(_) => "renderer panicked".to_string(),
            };
            let id = id(item);
            warn!("Failed to render destination '{}': {}", id, failure);
            Rendered::Unavailable {
                id,
                message: CARD_UNAVAILABLE.to_string(),
            }
        })
        .collect()
}

/// Cards for the first few destinations of a turn
#[must_use]
pub fn turn_cards(turn: &Turn) -> Vec<Rendered<CardView>> {
    let shown = &turn.results()[..turn.results().len().min(MAX_CARDS_PER_TURN)];
    render_each(
        shown,
        |d: &Destination| d.object_id.clone(),
        |d| Ok::<_, fmt::Error>(CardView::new(d)),
    )
}

/// Piece of message text, either plain or emphasized with `**...**`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    Plain(String),
    Strong(String),
}

/// Split message text on `**bold**` markers. An unmatched marker is kept as
/// plain text.
#[must_use]
pub fn emphasis_segments(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Plain(rest[..start].to_string()));
        }
        segments.push(Segment::Strong(after[..end].to_string()));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Plain(rest.to_string()));
    }
    segments
}

/// A turn ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnView {
    pub role: crate::models::Role,
    pub segments: Vec<Segment>,
    pub error: bool,
    pub cards: Vec<Rendered<CardView>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            segments: emphasis_segments(&turn.content),
            error: turn.error,
            cards: turn_cards(turn),
            created_at: turn.created_at,
        }
    }
}

fn bar(fraction: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (fraction.clamp(0.0, 1.0) * BAR_CELLS as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

/// Terminal rendering of a card. `expanded` adds transport, features,
/// tip and accommodations.
pub fn write_card(out: &mut impl Write, card: &CardView, expanded: bool) -> fmt::Result {
    write!(out, "┌ {}", card.name)?;
    if !card.location.is_empty() {
        write!(out, " ({})", card.location)?;
    }
    writeln!(out, "  🌿 {:.1}/10", card.sustainability_score)?;

    writeln!(
        out,
        "│ {:<8} {} {:.1}",
        card.carbon.label,
        bar(card.carbon.fill),
        card.carbon.score
    )?;

    let mut tags: Vec<&str> = card.activities.iter().map(String::as_str).collect();
    if !card.season.is_empty() {
        tags.push(&card.season);
    }
    if !tags.is_empty() {
        writeln!(out, "│ {}", tags.join(" · "))?;
    }

    write!(out, "│ {}", card.price)?;
    if card.family_friendly {
        write!(out, "  👨‍👩‍👧‍👦 Family")?;
    }
    writeln!(out)?;

    if expanded {
        writeln!(out, "│ Carbon per 1000km")?;
        if card.transport.is_empty() {
            writeln!(out, "│   {NO_TRANSPORT_DATA}")?;
        }
        for option in &card.transport {
            writeln!(
                out,
                "│   {} {:<15} {} {}kg",
                option.icon,
                option.label,
                bar(option.width),
                option.carbon_kg_per_1000km
            )?;
        }
        if !card.green_features.is_empty() {
            writeln!(out, "│ 🌱 Green Features: {}", card.green_features.join(", "))?;
        }
        if !card.green_tip.is_empty() {
            writeln!(out, "│ 💡 Green Tip: {}", card.green_tip)?;
        }
        for acc in &card.accommodations {
            writeln!(out, "│ {} · {} {}", acc.kind, acc.leaves, acc.description)?;
        }
    }

    writeln!(out, "└")
}

/// Terminal rendering of a whole turn, content first and then its cards
#[must_use]
pub fn turn_text(turn: &Turn, expanded: bool, bold: bool) -> String {
    let mut out = String::new();
    for segment in emphasis_segments(&turn.content) {
        match segment {
            Segment::Plain(text) => out.push_str(&text),
            Segment::Strong(text) if bold => {
                out.push_str("\x1b[1m");
                out.push_str(&text);
                out.push_str("\x1b[0m");
            }
            Segment::Strong(text) => out.push_str(&text),
        }
    }
    out.push('\n');

    let shown = &turn.results()[..turn.results().len().min(MAX_CARDS_PER_TURN)];
    let cards = render_each(
        shown,
        |d: &Destination| d.object_id.clone(),
        |d| {
            let mut card = String::new();
            write_card(&mut card, &CardView::new(d), expanded).map(|()| card)
        },
    );
    for card in cards {
        out.push('\n');
        match card {
            Rendered::Ok { view } => out.push_str(&view),
            Rendered::Unavailable { message, .. } => {
                out.push_str("⚠️  ");
                out.push_str(&message);
                out.push('\n');
            }
        }
    }
    out
}
