use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use super::repo;
use crate::{
    auth::extractors::CurrentUser, error::ApiError, movies::dto::MovieList, state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route(
            "/favorites/:movie_id",
            post(add_favorite).delete(remove_favorite),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MovieList>, ApiError> {
    let results = repo::list_for_user(&state.db, user.id).await?;
    Ok(Json(MovieList { results }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo::add(&state.db, user.id, movie_id).await?;
    info!(movie_id, "favorite added");
    Ok(Json(json!({ "ok": true })))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repo::remove(&state.db, user.id, movie_id).await? {
        return Err(ApiError::NotFound("Favorite not found"));
    }
    info!(movie_id, "favorite removed");
    Ok(Json(json!({ "ok": true })))
}
