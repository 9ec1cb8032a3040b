use sqlx::PgPool;
use uuid::Uuid;

use crate::movies::repo::MovieSummary;

/// Favorited movies, most recently added first.
pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<MovieSummary>, sqlx::Error> {
    sqlx::query_as::<_, MovieSummary>(
        r#"
        SELECT m.id, m.title, m.overview, m.poster_path, m.backdrop_path,
               m.release_date, m.vote_average, m.vote_count, m.popularity
        FROM favorites f
        JOIN movies m ON m.id = f.movie_id
        WHERE f.user_id = $1
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Idempotent add; the (user, movie) primary key absorbs duplicates.
pub async fn add(db: &PgPool, user_id: Uuid, movie_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO favorites (user_id, movie_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, movie_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(movie_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Returns false when the pairing did not exist.
pub async fn remove(db: &PgPool, user_id: Uuid, movie_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM favorites
        WHERE user_id = $1 AND movie_id = $2
        "#,
    )
    .bind(user_id)
    .bind(movie_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
