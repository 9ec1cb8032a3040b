//! One-shot catalog seeder against the TMDB v3 API.
//!
//! `cargo run --bin seed` pulls genres plus a few pages of the curated movie
//! lists and upserts them; `cargo run --bin seed -- --user` creates the
//! sample dev account instead.

use anyhow::Context;
use serde::Deserialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::{macros::format_description, Date};
use tracing::{info, warn};

use reelbase::auth::password::hash_password;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: i32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MoviePageResponse {
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: i32,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<i32>,
    popularity: Option<f64>,
    adult: Option<bool>,
    original_language: Option<String>,
    #[serde(default)]
    genre_ids: Vec<i32>,
}

impl TmdbMovie {
    fn release_date(&self) -> Option<Date> {
        let format = format_description!("[year]-[month]-[day]");
        self.release_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| Date::parse(s, &format).ok())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "seed=info,reelbase=info".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    if std::env::args().any(|a| a == "--user") {
        return seed_user(&db).await;
    }

    let bearer = std::env::var("TMDB_BEARER").context("TMDB_BEARER is required")?;
    let client = reqwest::Client::new();

    seed_genres(&client, &bearer, &db).await?;
    seed_list(&client, &bearer, &db, "/movie/popular", 3).await?;
    seed_list(&client, &bearer, &db, "/movie/top_rated", 3).await?;
    seed_list(&client, &bearer, &db, "/movie/now_playing", 2).await?;
    seed_list(&client, &bearer, &db, "/movie/upcoming", 2).await?;

    info!("done seeding");
    Ok(())
}

async fn seed_genres(client: &reqwest::Client, bearer: &str, db: &PgPool) -> anyhow::Result<()> {
    let page: GenreListResponse = client
        .get(format!("{TMDB_BASE}/genre/movie/list"))
        .header("Authorization", bearer)
        .query(&[("language", "en-US")])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    for genre in &page.genres {
        sqlx::query(
            r#"
            INSERT INTO genres (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(genre.id)
        .bind(&genre.name)
        .execute(db)
        .await?;
    }
    info!(count = page.genres.len(), "seeded genres");
    Ok(())
}

async fn seed_list(
    client: &reqwest::Client,
    bearer: &str,
    db: &PgPool,
    endpoint: &str,
    pages: u32,
) -> anyhow::Result<()> {
    for page in 1..=pages {
        let page_param = page.to_string();
        let body: MoviePageResponse = client
            .get(format!("{TMDB_BASE}{endpoint}"))
            .header("Authorization", bearer)
            .query(&[("language", "en-US"), ("page", page_param.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for movie in &body.results {
            upsert_movie(db, movie).await?;
        }
        info!(endpoint, page, "seeded page");
    }
    Ok(())
}

async fn upsert_movie(db: &PgPool, movie: &TmdbMovie) -> anyhow::Result<()> {
    let title = movie
        .title
        .clone()
        .or_else(|| movie.name.clone())
        .unwrap_or_default();
    if title.is_empty() {
        warn!(movie_id = movie.id, "skipping movie without a title");
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO movies (id, title, overview, poster_path, backdrop_path,
                            release_date, vote_average, vote_count, popularity,
                            adult, original_language)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            overview = EXCLUDED.overview,
            poster_path = EXCLUDED.poster_path,
            backdrop_path = EXCLUDED.backdrop_path,
            release_date = EXCLUDED.release_date,
            vote_average = EXCLUDED.vote_average,
            vote_count = EXCLUDED.vote_count,
            popularity = EXCLUDED.popularity,
            adult = EXCLUDED.adult,
            original_language = EXCLUDED.original_language
        "#,
    )
    .bind(movie.id)
    .bind(&title)
    .bind(movie.overview.clone().unwrap_or_default())
    .bind(&movie.poster_path)
    .bind(&movie.backdrop_path)
    .bind(movie.release_date())
    .bind(movie.vote_average.unwrap_or(0.0))
    .bind(movie.vote_count.unwrap_or(0))
    .bind(movie.popularity.unwrap_or(0.0))
    .bind(movie.adult.unwrap_or(false))
    .bind(&movie.original_language)
    .execute(db)
    .await?;

    // Reset-and-set the genre links; ids the genre table has never seen are
    // skipped rather than tripping the foreign key.
    sqlx::query("DELETE FROM movie_genres WHERE movie_id = $1")
        .bind(movie.id)
        .execute(db)
        .await?;
    for genre_id in &movie.genre_ids {
        sqlx::query(
            r#"
            INSERT INTO movie_genres (movie_id, genre_id)
            SELECT $1, $2
            WHERE EXISTS (SELECT 1 FROM genres WHERE id = $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(movie.id)
        .bind(genre_id)
        .execute(db)
        .await?;
    }
    Ok(())
}

/// Creates the sample dev account if it does not exist yet.
async fn seed_user(db: &PgPool) -> anyhow::Result<()> {
    let email = "test@example.com";
    let password = "123456";

    let exists: Option<(uuid::Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(db)
            .await?;
    if exists.is_some() {
        info!(email, "sample user already exists");
        return Ok(());
    }

    let hash = hash_password(password)?;
    sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, name)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(email)
    .bind(&hash)
    .bind("Test User")
    .execute(db)
    .await?;

    info!(email, "sample user created");
    Ok(())
}
