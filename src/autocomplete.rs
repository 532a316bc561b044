//! Debounced autocomplete
//!
//! Every input snapshot restarts a quiet-period timer; only the input still
//! current when the timer fires is sent to the index. Each snapshot bumps a
//! generation counter and a response is applied only if its generation is
//! still the latest, so a slow stale response can never overwrite newer
//! suggestions.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::AutocompleteConfig;
use crate::search::{SearchGateway, Suggestion};

/// What the suggestion list currently shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionState {
    /// Input the suggestions belong to, empty when idle
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    /// A request is scheduled or in flight
    pub pending: bool,
}

pub struct Autocomplete {
    gateway: Arc<SearchGateway>,
    debounce: Duration,
    min_query_len: usize,
    generation: Arc<AtomicU64>,
    scheduled: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<SuggestionState>>,
}

impl Autocomplete {
    #[must_use]
    pub fn new(gateway: Arc<SearchGateway>, config: &AutocompleteConfig) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            gateway,
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            generation: Arc::new(AtomicU64::new(0)),
            scheduled: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    /// Feed the current contents of the input box. Must be called from
    /// within a tokio runtime.
    pub fn input(&self, text: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = self.take_scheduled() {
            previous.abort();
        }

        let query = text.trim().to_string();
        if query.chars().count() < self.min_query_len {
            self.state.send_replace(SuggestionState::default());
            return;
        }

        self.state.send_modify(|state| state.pending = true);

        let gateway = Arc::clone(&self.gateway);
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            debug!("Requesting suggestions for '{}'", query);
            let result = gateway.suggest(&query).await;

            if latest.load(Ordering::SeqCst) != generation {
                debug!("Dropping stale suggestions for '{}'", query);
                return;
            }

            let suggestions = result.unwrap_or_else(|e| {
                warn!("Suggestion request for '{}' failed: {}", query, e);
                Vec::new()
            });
            state.send_replace(SuggestionState {
                query,
                suggestions,
                pending: false,
            });
        });

        if let Ok(mut scheduled) = self.scheduled.lock() {
            *scheduled = Some(handle);
        }
    }

    fn take_scheduled(&self) -> Option<JoinHandle<()>> {
        self.scheduled.lock().ok().and_then(|mut scheduled| scheduled.take())
    }

    /// Snapshot of the current suggestions
    #[must_use]
    pub fn current(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever the suggestion state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }
}

impl Drop for Autocomplete {
    fn drop(&mut self) {
        if let Some(handle) = self.take_scheduled() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EcoVoyageConfig;
    use crate::search::{SearchBackend, SearchRequest};
    use crate::{EcoVoyageError, Result};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    /// Records every query; queries listed in `slow` take a second to answer
    #[derive(Default)]
    struct RecordingBackend {
        queries: std::sync::Mutex<Vec<String>>,
        slow: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl SearchBackend for RecordingBackend {
        async fn query(&self, request: &SearchRequest) -> Result<Vec<Value>> {
            self.queries.lock().unwrap().push(request.query.clone());
            if self.slow.contains(&request.query.as_str()) {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            if self.fail {
                return Err(EcoVoyageError::search("offline"));
            }
            Ok(vec![json!({
                "name": format!("Match for {}", request.query),
                "country": "Italy",
                "region": "Tuscany"
            })])
        }
    }

    fn autocomplete(backend: Arc<RecordingBackend>) -> Autocomplete {
        let config = EcoVoyageConfig::default();
        let gateway = Arc::new(SearchGateway::new(backend, &config));
        Autocomplete::new(gateway, &config.autocomplete)
    }

    async fn pause(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_issues_one_request() {
        let backend = Arc::new(RecordingBackend::default());
        let ac = autocomplete(backend.clone());

        ac.input("it");
        pause(50).await;
        ac.input("ita");
        pause(50).await;
        ac.input("ital");
        assert!(ac.current().pending);
        pause(300).await;

        assert_eq!(*backend.queries.lock().unwrap(), vec!["ital".to_string()]);
        let state = ac.current();
        assert_eq!(state.query, "ital");
        assert!(!state.pending);
        assert_eq!(state.suggestions.len(), 1);
        assert_eq!(state.suggestions[0].name, "Match for ital");
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_clears_without_request() {
        let backend = Arc::new(RecordingBackend::default());
        let ac = autocomplete(backend.clone());

        ac.input("costa");
        pause(300).await;
        assert_eq!(ac.current().suggestions.len(), 1);

        ac.input("c");
        assert_eq!(ac.current(), SuggestionState::default());
        ac.input("   ");
        pause(300).await;

        assert_eq!(*backend.queries.lock().unwrap(), vec!["costa".to_string()]);
        assert_eq!(ac.current(), SuggestionState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_overwrites_newer_input() {
        let backend = Arc::new(RecordingBackend {
            slow: vec!["nor"],
            ..Default::default()
        });
        let ac = autocomplete(backend.clone());

        ac.input("nor");
        // past the quiet period, the slow request is now in flight
        pause(250).await;
        ac.input("norway");
        pause(2000).await;

        let state = ac.current();
        assert_eq!(state.query, "norway");
        assert_eq!(state.suggestions[0].name, "Match for norway");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_request_clears_suggestions() {
        let backend = Arc::new(RecordingBackend {
            fail: true,
            ..Default::default()
        });
        let ac = autocomplete(backend);

        ac.input("iceland");
        pause(300).await;

        let state = ac.current();
        assert_eq!(state.query, "iceland");
        assert!(state.suggestions.is_empty());
        assert!(!state.pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates() {
        let backend = Arc::new(RecordingBackend::default());
        let ac = autocomplete(backend);
        let mut rx = ac.subscribe();

        ac.input("peru");
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().pending);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().query, "peru");
    }
}
