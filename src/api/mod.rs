//! JSON API over conversations
//!
//! Each conversation lives in memory for as long as the process runs and
//! owns its own autocomplete debouncer.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::autocomplete::{Autocomplete, SuggestionState};
use crate::config::{AutocompleteConfig, default_max_conversations};
use crate::conversation::{Conversation, SUGGESTED_QUERIES};
use crate::render::TurnView;
use crate::search::SearchGateway;
use crate::EcoVoyageError;

pub struct AppState {
    gateway: Arc<SearchGateway>,
    autocomplete: AutocompleteConfig,
    max_conversations: usize,
    sessions: RwLock<Sessions>,
}

/// Live conversations, oldest first in `order`
#[derive(Default)]
struct Sessions {
    by_id: HashMap<Uuid, Arc<Session>>,
    order: VecDeque<Uuid>,
}

impl Sessions {
    /// Insert `session`, evicting the oldest conversations beyond `capacity`
    fn insert(&mut self, id: Uuid, session: Session, capacity: usize) {
        while self.by_id.len() >= capacity.max(1) {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.by_id.remove(&oldest);
            debug!("Evicted conversation {}", oldest);
        }
        self.by_id.insert(id, Arc::new(session));
        self.order.push_back(id);
    }
}

struct Session {
    conversation: Mutex<Conversation>,
    autocomplete: Autocomplete,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: Arc<SearchGateway>, autocomplete: AutocompleteConfig) -> Self {
        Self {
            gateway,
            autocomplete,
            max_conversations: default_max_conversations(),
            sessions: RwLock::new(Sessions::default()),
        }
    }

    /// Keep at most `max` conversations; creating one more drops the oldest
    #[must_use]
    pub fn with_max_conversations(mut self, max: usize) -> Self {
        self.max_conversations = max;
        self
    }

    pub async fn conversation_count(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }

    async fn session(&self, id: Uuid) -> Result<Arc<Session>, EcoVoyageError> {
        self.sessions
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| EcoVoyageError::not_found(format!("conversation {id}")))
    }
}

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct ConversationView {
    pub id: Uuid,
    pub loading: bool,
    pub suggested_queries: &'static [&'static str],
    pub turns: Vec<TurnView>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub turns: Vec<TurnView>,
}

/// Maps library errors onto HTTP statuses
pub struct ApiError(EcoVoyageError);

impl From<EcoVoyageError> for ApiError {
    fn from(err: EcoVoyageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EcoVoyageError::Validation { .. } => StatusCode::BAD_REQUEST,
            EcoVoyageError::NotFound { .. } => StatusCode::NOT_FOUND,
            EcoVoyageError::Busy => StatusCode::CONFLICT,
            other => {
                error!("Request failed: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": self.0.user_message() })),
        )
            .into_response()
    }
}

fn view(id: Uuid, conversation: &Conversation) -> ConversationView {
    ConversationView {
        id,
        loading: conversation.is_loading(),
        suggested_queries: conversation.suggested_queries(),
        turns: conversation.turns().iter().map(TurnView::from).collect(),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/suggested-queries", get(suggested_queries))
        .route("/conversations", post(create_conversation))
        .route("/conversations/{id}", get(get_conversation))
        .route("/conversations/{id}/messages", post(post_message))
        .route("/conversations/{id}/draft", post(post_draft))
        .route("/conversations/{id}/suggestions", get(get_suggestions))
        .with_state(state)
}

async fn suggested_queries() -> Json<&'static [&'static str]> {
    Json(&SUGGESTED_QUERIES[..])
}

async fn create_conversation(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ConversationView>) {
    let id = Uuid::new_v4();
    let conversation = Conversation::new();
    let body = view(id, &conversation);

    let session = Session {
        conversation: Mutex::new(conversation),
        autocomplete: Autocomplete::new(Arc::clone(&state.gateway), &state.autocomplete),
    };
    state
        .sessions
        .write()
        .await
        .insert(id, session, state.max_conversations);
    info!("Started conversation {}", id);

    (StatusCode::CREATED, Json(body))
}

async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationView>, ApiError> {
    let session = state.session(id).await?;
    let conversation = session.conversation.lock().await;
    Ok(Json(view(id, &conversation)))
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TextRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session = state.session(id).await?;

    let (pending, user_turn) = {
        let mut conversation = session.conversation.lock().await;
        let pending = conversation.begin_submit(&request.text)?;
        let user_turn = conversation.turns().last().map(TurnView::from);
        (pending, user_turn)
    };

    // Runs detached so a dropped client connection cannot leave the
    // conversation stuck in the loading state.
    let gateway = Arc::clone(&state.gateway);
    let worker = Arc::clone(&session);
    let search = tokio::spawn(async move {
        let outcome = gateway.search(pending.query()).await;
        let mut conversation = worker.conversation.lock().await;
        TurnView::from(conversation.complete(pending, outcome))
    });

    let assistant_turn = match search.await {
        Ok(turn) => turn,
        Err(e) => {
            error!("Search task for conversation {} failed: {}", id, e);
            let mut conversation = session.conversation.lock().await;
            conversation
                .abandon("the search was interrupted")
                .map(TurnView::from)
                .ok_or_else(|| EcoVoyageError::general(format!("search task failed: {e}")))?
        }
    };

    Ok(Json(SubmitResponse {
        turns: user_turn.into_iter().chain([assistant_turn]).collect(),
    }))
}

async fn post_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TextRequest>,
) -> Result<StatusCode, ApiError> {
    let session = state.session(id).await?;
    session.autocomplete.input(&request.text);
    Ok(StatusCode::ACCEPTED)
}

async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuggestionState>, ApiError> {
    let session = state.session(id).await?;
    Ok(Json(session.autocomplete.current()))
}
