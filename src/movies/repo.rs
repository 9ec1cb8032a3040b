use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::Date;

use super::dto::Page;

/// List projection of a movie; the heavier catalog columns (adult,
/// original_language) stay out of the wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<Date>,
    pub vote_average: f64,
    pub vote_count: i32,
    pub popularity: f64,
}

pub async fn list_popular(db: &PgPool, page: Page) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies
        ORDER BY popularity DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await
}

pub async fn list_top_rated(db: &PgPool, page: Page) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies
        ORDER BY vote_average DESC, vote_count DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await
}

/// Movies releasing strictly after `today`, soonest first.
pub async fn list_upcoming(
    db: &PgPool,
    today: Date,
    page: Page,
) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies
        WHERE release_date > $1
        ORDER BY release_date ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(today)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await
}

/// Movies released inside the `[start, end]` window, newest first.
pub async fn list_now_playing(
    db: &PgPool,
    start: Date,
    end: Date,
    page: Page,
) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies
        WHERE release_date >= $1 AND release_date <= $2
        ORDER BY release_date DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await
}

/// Movies carrying at least one of `genre_ids`; an empty list means no
/// filter at all.
pub async fn discover(
    db: &PgPool,
    genre_ids: &[i32],
    page: Page,
) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies m
        WHERE cardinality($1::int[]) = 0
           OR EXISTS (
                SELECT 1 FROM movie_genres mg
                WHERE mg.movie_id = m.id AND mg.genre_id = ANY($1)
           )
        ORDER BY popularity DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(genre_ids)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await
}

/// Escapes LIKE metacharacters so the user's query matches literally
/// (a search for "100%" must not act as a wildcard).
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-insensitive title substring search.
pub async fn search(
    db: &PgPool,
    query: &str,
    page: Page,
) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies
        WHERE title ILIKE '%' || $1 || '%'
        ORDER BY popularity DESC, vote_average DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(escape_like(query))
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT id, title, overview, poster_path, backdrop_path, release_date,
               vote_average, vote_count, popularity
        FROM movies
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped_to_literals() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn plain_queries_pass_through_unchanged() {
        assert_eq!(escape_like("batman"), "batman");
        assert_eq!(escape_like(""), "");
    }
}
