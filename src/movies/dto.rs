use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::MovieSummary;
use crate::genres::repo::Genre;

/// `page`/`pageSize` query parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// Resolved LIMIT/OFFSET window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub const MAX_PAGE_SIZE: i64 = 20;

    pub fn resolve(&self) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let size = self
            .page_size
            .unwrap_or(Self::MAX_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE);
        // page is clamped to >= 1, so the subtraction cannot underflow; the
        // multiplication saturates instead of overflowing on absurd pages.
        Page {
            limit: size,
            offset: (page - 1).saturating_mul(size),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    #[serde(default)]
    pub with_genres: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

/// "28,12" -> [28, 12]; unparseable segments are dropped.
pub fn parse_genre_ids(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<i32>().ok())
        .collect()
}

#[derive(Debug, Serialize)]
pub struct MovieList {
    pub results: Vec<MovieSummary>,
}

/// Detail projection with embedded genres, shaped like the upstream catalog.
#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: i32,
    pub release_date: Option<Date>,
    pub genres: Vec<Genre>,
}

impl MovieDetail {
    pub fn from_parts(movie: MovieSummary, genres: Vec<Genre>) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            overview: movie.overview,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            release_date: movie.release_date,
            genres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let page = Pagination::default().resolve();
        assert_eq!(page, Page { limit: 20, offset: 0 });
    }

    #[test]
    fn second_page_of_ten_skips_ten() {
        let page = Pagination {
            page: Some(2),
            page_size: Some(10),
        }
        .resolve();
        assert_eq!(page, Page { limit: 10, offset: 10 });
    }

    #[test]
    fn oversized_page_size_clamps_to_twenty() {
        let page = Pagination {
            page: Some(1),
            page_size: Some(500),
        }
        .resolve();
        assert_eq!(page.limit, 20);
    }

    #[test]
    fn nonsense_values_normalize() {
        let page = Pagination {
            page: Some(-3),
            page_size: Some(0),
        }
        .resolve();
        assert_eq!(page, Page { limit: 1, offset: 0 });
    }

    #[test]
    fn huge_page_number_saturates_instead_of_overflowing() {
        let page = Pagination {
            page: Some(i64::MAX),
            page_size: Some(20),
        }
        .resolve();
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, i64::MAX);
    }

    #[test]
    fn genre_csv_parses_and_drops_garbage() {
        assert_eq!(parse_genre_ids("28,12"), vec![28, 12]);
        assert_eq!(parse_genre_ids("28, 12 ,abc,"), vec![28, 12]);
        assert!(parse_genre_ids("").is_empty());
        assert!(parse_genre_ids("x,y").is_empty());
    }
}
