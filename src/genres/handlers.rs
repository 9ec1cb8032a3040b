use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use super::repo::{self, Genre};
use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/genres", get(list_genres))
}

#[derive(Debug, Serialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

#[instrument(skip(state))]
async fn list_genres(State(state): State<AppState>) -> Result<Json<GenreList>, ApiError> {
    let genres = repo::list_all(&state.db).await?;
    Ok(Json(GenreList { genres }))
}
