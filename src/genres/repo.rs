use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Genre as sourced from the external catalog; immutable outside seeding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

pub async fn list_all(db: &PgPool) -> Result<Vec<Genre>, sqlx::Error> {
    sqlx::query_as::<_, Genre>(
        r#"
        SELECT id, name
        FROM genres
        ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

/// Genres attached to one movie.
pub async fn list_for_movie(db: &PgPool, movie_id: i32) -> Result<Vec<Genre>, sqlx::Error> {
    sqlx::query_as::<_, Genre>(
        r#"
        SELECT g.id, g.name
        FROM genres g
        JOIN movie_genres mg ON mg.genre_id = g.id
        WHERE mg.movie_id = $1
        ORDER BY g.id ASC
        "#,
    )
    .bind(movie_id)
    .fetch_all(db)
    .await
}
