use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::instrument;

use super::{
    dto::{parse_genre_ids, DiscoverQuery, MovieDetail, MovieList, Pagination, SearchQuery},
    repo,
};
use crate::{error::ApiError, genres, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies/popular", get(popular))
        .route("/movies/top_rated", get(top_rated))
        .route("/movies/upcoming", get(upcoming))
        .route("/movies/now_playing", get(now_playing))
        .route("/movies/discover", get(discover))
        .route("/movies/search", get(search))
        .route("/movies/:id", get(detail))
}

#[instrument(skip(state))]
async fn popular(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<MovieList>, ApiError> {
    let results = repo::list_popular(&state.db, p.resolve()).await?;
    Ok(Json(MovieList { results }))
}

#[instrument(skip(state))]
async fn top_rated(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<MovieList>, ApiError> {
    let results = repo::list_top_rated(&state.db, p.resolve()).await?;
    Ok(Json(MovieList { results }))
}

#[instrument(skip(state))]
async fn upcoming(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<MovieList>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let results = repo::list_upcoming(&state.db, today, p.resolve()).await?;
    Ok(Json(MovieList { results }))
}

/// Released within the last 90 days.
#[instrument(skip(state))]
async fn now_playing(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<MovieList>, ApiError> {
    let end = OffsetDateTime::now_utc().date();
    let start = end - TimeDuration::days(90);
    let results = repo::list_now_playing(&state.db, start, end, p.resolve()).await?;
    Ok(Json(MovieList { results }))
}

#[instrument(skip(state))]
async fn discover(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
    Query(q): Query<DiscoverQuery>,
) -> Result<Json<MovieList>, ApiError> {
    let genre_ids = q
        .with_genres
        .as_deref()
        .map(parse_genre_ids)
        .unwrap_or_default();
    let results = repo::discover(&state.db, &genre_ids, p.resolve()).await?;
    Ok(Json(MovieList { results }))
}

#[instrument(skip(state))]
async fn search(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<MovieList>, ApiError> {
    let needle = q.query.as_deref().unwrap_or("").trim().to_string();
    // Blank queries never reach the store.
    if needle.is_empty() {
        return Ok(Json(MovieList {
            results: Vec::new(),
        }));
    }
    let results = repo::search(&state.db, &needle, p.resolve()).await?;
    Ok(Json(MovieList { results }))
}

#[instrument(skip(state))]
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MovieDetail>, ApiError> {
    let movie = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Movie not found"))?;
    let genres = genres::repo::list_for_movie(&state.db, id).await?;
    Ok(Json(MovieDetail::from_parts(movie, genres)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The blank-query short circuit must not touch the pool; the fake state
    // only ever connects lazily, so a store round trip would hang or error.
    #[tokio::test]
    async fn blank_search_returns_empty_without_store_access() {
        let state = AppState::fake();
        for raw in [None, Some("".to_string()), Some("   ".to_string())] {
            let result = search(
                State(state.clone()),
                Query(Pagination::default()),
                Query(SearchQuery { query: raw }),
            )
            .await
            .expect("blank search should succeed");
            assert!(result.0.results.is_empty());
        }
    }
}
