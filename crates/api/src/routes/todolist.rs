//! Todo list persisted through the transactional gateway.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Form, Json};
use gateway::{Statement, StatementResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub const INSERT_TODO: &str =
    "INSERT INTO todo_entries (id, title, description, done) VALUES (?, ?, ?, ?)";

#[derive(Debug, Deserialize)]
pub struct TodoForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub done: bool,
}

impl TodoEntry {
    /// Rebuilds an entry from a committed insert statement.
    fn from_statement(statement: &Statement) -> Option<Self> {
        if !statement.sql.trim().starts_with("INSERT INTO todo_entries") {
            return None;
        }
        match statement.params.as_slice() {
            [Value::String(id), Value::String(title), Value::String(description), done] => {
                Some(Self {
                    id: id.clone(),
                    title: title.clone(),
                    description: description.clone(),
                    done: done.as_bool().unwrap_or(false),
                })
            }
            _ => None,
        }
    }
}

/// GET /todolist — committed entries.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<TodoEntry>> {
    let entries = state
        .gateway
        .backend()
        .committed()
        .await
        .iter()
        .filter_map(TodoEntry::from_statement)
        .collect();
    Json(entries)
}

/// POST /todolist — persist an entry, then redirect back to the list.
#[tracing::instrument(skip(state, form), fields(title = %form.title))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TodoForm>,
) -> Result<impl IntoResponse, ApiError> {
    if form.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let statement = Statement::new(INSERT_TODO)
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(form.title)
        .bind(form.description)
        .bind(false);

    match state.gateway.run_statement(statement).await? {
        StatementResult::Success { .. } => {
            Ok((StatusCode::FOUND, [(header::LOCATION, "/todolist")]))
        }
        StatementResult::Failure { reason } => Err(ApiError::Persistence(reason.to_string())),
    }
}
