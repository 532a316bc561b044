//! Conversation state and the submit flow
//!
//! The log is append-only. A submit appends the user's turn right away,
//! runs the search, then appends exactly one assistant turn. Only one
//! search may be in flight per conversation, which keeps every user turn
//! immediately followed by its own answer.

use tracing::{debug, info, warn};

use crate::models::Turn;
use crate::search::{SearchGateway, SearchOutcome};
use crate::summary::summarize;
use crate::{EcoVoyageError, Result};

pub const WELCOME_MESSAGE: &str = "Welcome to EcoVoyage AI! 🌍🌿\n\nI'm your sustainable travel companion. I help you discover eco-friendly destinations while minimizing your carbon footprint.\n\nTell me about your dream trip: where you want to go, what activities you enjoy, or what matters most to you about sustainable travel. I'll find destinations that match your values!\n\n**Try asking:**\n- \"Find eco-lodges in Costa Rica\"\n- \"Compare train vs flight to Norway\"\n- \"Family-friendly nature trips under $100/night\"";

/// Starter queries offered before the first user message
pub const SUGGESTED_QUERIES: [&str; 5] = [
    "Find me eco-friendly beach destinations in Costa Rica",
    "What's the lowest carbon way to travel through Europe?",
    "Plan a family-friendly nature trip under $100/night",
    "Show me mountain retreats with solar power",
    "Compare train vs flight emissions for Norway trip",
];

#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
    /// Query of the search currently in flight
    in_flight: Option<String>,
}

/// Ticket for a submitted query whose search has not resolved yet. Hand it
/// back to [`Conversation::complete`].
#[derive(Debug)]
#[must_use]
pub struct PendingSubmit {
    query: String,
}

impl PendingSubmit {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// New conversation seeded with the welcome message
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(WELCOME_MESSAGE)],
            in_flight: None,
        }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// A search is currently in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starter queries are offered until the user has said something
    #[must_use]
    pub fn suggested_queries(&self) -> &'static [&'static str] {
        if self.turns.len() <= 1 {
            &SUGGESTED_QUERIES
        } else {
            &[]
        }
    }

    /// Echo the user's text as a turn and reserve the in-flight slot.
    ///
    /// Fails with `Validation` for blank input and `Busy` while another
    /// search has not completed; nothing is appended in either case.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingSubmit> {
        let query = text.trim();
        if query.is_empty() {
            return Err(EcoVoyageError::validation("Message cannot be empty"));
        }
        if self.in_flight.is_some() {
            return Err(EcoVoyageError::Busy);
        }

        self.turns.push(Turn::user(query));
        self.in_flight = Some(query.to_string());
        debug!("Submitted '{}' as turn {}", query, self.turns.len() - 1);

        Ok(PendingSubmit {
            query: query.to_string(),
        })
    }

    /// Append the assistant's answer for `pending` and release the slot
    pub fn complete(&mut self, pending: PendingSubmit, outcome: SearchOutcome) -> &Turn {
        let content = summarize(&pending.query, &outcome.records, outcome.error.as_deref());
        let error = outcome.error.is_some();

        info!(
            "Answering '{}' with {} destinations{}",
            pending.query,
            outcome.records.len(),
            if error { " (search failed)" } else { "" }
        );

        self.turns.push(Turn::reply(content, outcome.records, error));
        self.in_flight = None;
        &self.turns[self.turns.len() - 1]
    }

    /// Answer the in-flight submit with an error turn when its search never
    /// completed, releasing the slot. Returns `None` if nothing was in flight.
    pub fn abandon(&mut self, reason: &str) -> Option<&Turn> {
        let query = self.in_flight.take()?;
        warn!("Abandoning search for '{}': {}", query, reason);

        let content = summarize(&query, &[], Some(reason));
        self.turns.push(Turn::reply(content, Vec::new(), true));
        self.turns.last()
    }

    /// Full submit: echo, search, answer. Returns the assistant turn.
    pub async fn submit(&mut self, gateway: &SearchGateway, text: &str) -> Result<&Turn> {
        let pending = self.begin_submit(text)?;
        let outcome = gateway.search(pending.query()).await;
        Ok(self.complete(pending, outcome))
    }
}
