//! Assistant reply text for a search
//!
//! Deterministic and order-sensitive: the first record is the top pick, no
//! re-ranking happens here.

use std::fmt::Write;

use crate::models::Destination;

/// Transport under this many kg CO2 per 1000 km counts as low-carbon
pub const LOW_CARBON_THRESHOLD_KG: f64 = 50.0;

pub const NO_RESULTS_MESSAGE: &str = "I couldn't find destinations matching that criteria. Could you try a different search? For example, try specifying a country, activity type (hiking, snorkeling), or sustainability feature (solar powered, zero waste).";

const FOLLOW_UPS: &[&str] = &[
    "Compare transport emissions for a specific destination?",
    "Find lower-carbon alternatives?",
    "Show accommodations with higher green ratings?",
];

/// Compose the assistant reply for `query`.
///
/// An error always wins over the records; an empty result set yields
/// guidance on how to refine the search.
#[must_use]
pub fn summarize(query: &str, records: &[Destination], error: Option<&str>) -> String {
    if let Some(error) = error {
        return format!(
            "Sorry, I ran into an issue while searching for \"{}\": {error}. Please try again!",
            query.trim()
        );
    }

    let Some(top) = records.first() else {
        return NO_RESULTS_MESSAGE.to_string();
    };

    let count = records.len();
    let noun = if count == 1 { "destination" } else { "destinations" };

    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "I found {count} eco-friendly {noun} for you! Here's what stands out:\n");

    let location = top.location();
    if location.is_empty() {
        let _ = writeln!(out, "**Top Pick: {}**", top.name);
    } else {
        let _ = writeln!(out, "**Top Pick: {}** ({location})", top.name);
    }
    let _ = writeln!(
        out,
        "- Sustainability Score: {:.1}/10",
        one_decimal(top.sustainability_score)
    );
    let _ = writeln!(
        out,
        "- Carbon Footprint: {:.1}/10 (lower is better)",
        one_decimal(top.carbon_footprint_score)
    );

    let low_carbon = low_carbon_modes(top);
    if !low_carbon.is_empty() {
        let _ = writeln!(out, "- Low-carbon transport available: {}", low_carbon.join(", "));
    }

    let _ = writeln!(
        out,
        "\nAverage sustainability across results: **{:.1}/10** | Average carbon score: **{:.1}/10**",
        one_decimal(mean(records, |d| d.sustainability_score)),
        one_decimal(mean(records, |d| d.carbon_footprint_score))
    );

    if !top.green_offset_tip.is_empty() {
        let _ = writeln!(out, "\n💡 **{}**", top.green_offset_tip);
    }

    out.push_str("\nWould you like me to:");
    for follow_up in FOLLOW_UPS {
        let _ = write!(out, "\n- {follow_up}");
    }

    out
}

/// Labels of the transport options under the low-carbon threshold, in
/// record order
#[must_use]
pub fn low_carbon_modes(destination: &Destination) -> Vec<String> {
    destination
        .transport_options
        .iter()
        .filter(|t| t.carbon_kg_per_1000km < LOW_CARBON_THRESHOLD_KG)
        .map(|t| t.mode.label())
        .collect()
}

/// Round to one decimal with halves away from zero, so 8.25 reads 8.3.
/// `{:.1}` alone would round the half to even.
fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::cast_precision_loss)]
fn mean(records: &[Destination], score: impl Fn(&Destination) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(score).sum::<f64>() / records.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn destination(name: &str, sustainability: f64, carbon: f64) -> Destination {
        Destination::from_hit(&json!({
            "objectID": name,
            "name": name,
            "region": "Tuscany",
            "country": "Italy",
            "sustainability_score": sustainability,
            "carbon_footprint_score": carbon,
            "green_offset_tip": "Travel by night train to save a hotel night and 90% of emissions.",
            "transport_options": [
                {"mode": "economy_flight", "carbon_kg_per_1000km": 255},
                {"mode": "train", "carbon_kg_per_1000km": 14},
                {"mode": "electric_car", "carbon_kg_per_1000km": 53},
                {"mode": "bicycle", "carbon_kg_per_1000km": 0}
            ]
        }))
    }

    #[test]
    fn test_eco_lodges_in_italy_scenario() {
        let records = vec![
            destination("Chianti Eco Lodge", 8.5, 2.0),
            destination("Val d'Orcia Farm Stay", 9.0, 1.5),
            destination("Maremma Coastal Sanctuary", 8.0, 3.0),
        ];
        let text = summarize("eco-lodges in Italy", &records, None);

        assert!(text.starts_with("I found 3 eco-friendly destinations"));
        assert!(text.contains("**Top Pick: Chianti Eco Lodge** (Tuscany, Italy)"));
        assert!(text.contains("Sustainability Score: 8.5/10"));
        assert!(text.contains("Carbon Footprint: 2.0/10"));
        assert!(text.contains("Average sustainability across results: **8.5/10**"));
        assert!(text.contains("Average carbon score: **2.2/10**"));
        assert!(text.contains("Low-carbon transport available: train, bicycle"));
        assert!(text.contains("💡 **Travel by night train"));
        assert!(text.ends_with("- Show accommodations with higher green ratings?"));
    }

    #[test]
    fn test_single_result_and_missing_tip() {
        let mut only = destination("Lofoten Fjord Explorer", 7.0, 4.25);
        only.green_offset_tip.clear();
        only.transport_options.clear();
        only.region.clear();
        only.country.clear();

        let text = summarize("fjords", &[only], None);
        assert!(text.starts_with("I found 1 eco-friendly destination for you!"));
        assert!(text.contains("**Top Pick: Lofoten Fjord Explorer**\n"));
        assert!(text.contains("Carbon Footprint: 4.3/10"));
        assert!(!text.contains("Low-carbon transport"));
        assert!(!text.contains("💡"));
    }

    #[test]
    fn test_averages_round_halves_up() {
        let records = vec![
            destination("Lake Bled Cabins", 8.5, 2.0),
            destination("Soca Valley Camp", 8.0, 2.5),
        ];
        let text = summarize("slovenia", &records, None);
        assert!(text.contains("Average sustainability across results: **8.3/10**"));
        assert!(text.contains("Average carbon score: **2.3/10**"));
    }

    #[rstest::rstest]
    #[case(4.25, "4.3")]
    #[case(7.75, "7.8")]
    #[case(2.1666, "2.2")]
    #[case(9.96, "10.0")]
    fn test_one_decimal(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format!("{:.1}", one_decimal(value)), expected);
    }

    #[test]
    fn test_empty_results_give_guidance() {
        let text = summarize("underwater castles", &[], None);
        assert_eq!(text, NO_RESULTS_MESSAGE);
        assert!(text.contains("couldn't find destinations"));
        assert!(text.contains("try specifying"));
    }

    #[test]
    fn test_error_wins_over_records() {
        let records = vec![destination("Anything", 9.0, 1.0)];
        let text = summarize("beaches", &records, Some("Search error: connection refused"));
        assert!(text.starts_with("Sorry"));
        assert!(text.contains("issue while searching"));
        assert!(text.contains("connection refused"));
        assert!(!text.contains("Top Pick"));

        let text = summarize("beaches", &[], Some("timeout"));
        assert!(text.contains("timeout"));
        assert_ne!(text, NO_RESULTS_MESSAGE);
    }

    #[test]
    fn test_top_pick_follows_input_order() {
        let records = vec![destination("Second Best", 6.0, 6.0), destination("Best", 9.9, 0.5)];
        let text = summarize("q", &records, None);
        assert!(text.contains("**Top Pick: Second Best**"));
        assert!(text.contains("Sustainability Score: 6.0/10"));
    }

    #[test]
    fn test_sparse_records_still_summarize() {
        let records = vec![Destination::from_hit(&json!({})), Destination::from_hit(&json!(null))];
        let text = summarize("q", &records, None);
        assert!(text.contains("**Top Pick: Unnamed Destination**"));
        assert!(text.contains("Sustainability Score: 0.0/10"));
        assert!(text.contains("Carbon Footprint: 5.0/10"));
        assert!(!text.contains("NaN"));
    }
}
