use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::state::AppState;

/// Status board as a multi-document YAML stream.
pub async fn status_board(State(state): State<Arc<AppState>>) -> Response {
    match state.board.render() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/yaml")], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render status board");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to render status board",
            )
                .into_response()
        }
    }
}
