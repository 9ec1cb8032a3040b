use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub port: u16,
    /// Cookies are issued without `Secure` by default; flip this on behind HTTPS.
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            access_ttl: parse_expiry(
                std::env::var("JWT_EXPIRES_IN").ok(),
                Duration::from_secs(15 * 60),
            ),
            refresh_ttl: parse_expiry(
                std::env::var("JWT_REFRESH_EXPIRES_IN").ok(),
                Duration::from_secs(7 * 24 * 60 * 60),
            ),
        };
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(4000);
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Ok(Self {
            database_url,
            jwt,
            port,
            cookie_secure,
        })
    }
}

/// Parses an expiry knob: a bare seconds count ("900") or a suffixed
/// duration ("15m", "7d"). Anything unparseable falls back.
pub(crate) fn parse_expiry(raw: Option<String>, fallback: Duration) -> Duration {
    let Some(raw) = raw else {
        return fallback;
    };
    let raw = raw.trim();
    if raw.is_empty() || !raw.is_ascii() {
        return fallback;
    }
    if let Ok(secs) = raw.parse::<u64>() {
        return Duration::from_secs(secs);
    }
    let (num, unit) = raw.split_at(raw.len() - 1);
    let Ok(n) = num.parse::<u64>() else {
        return fallback;
    };
    match unit {
        "s" => Duration::from_secs(n),
        "m" => Duration::from_secs(n * 60),
        "h" => Duration::from_secs(n * 60 * 60),
        "d" => Duration::from_secs(n * 24 * 60 * 60),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: Duration = Duration::from_secs(123);

    #[test]
    fn parses_suffixed_durations() {
        assert_eq!(
            parse_expiry(Some("15m".into()), FALLBACK),
            Duration::from_secs(900)
        );
        assert_eq!(
            parse_expiry(Some("7d".into()), FALLBACK),
            Duration::from_secs(604_800)
        );
        assert_eq!(
            parse_expiry(Some("30s".into()), FALLBACK),
            Duration::from_secs(30)
        );
        assert_eq!(
            parse_expiry(Some("2h".into()), FALLBACK),
            Duration::from_secs(7200)
        );
    }

    #[test]
    fn parses_bare_seconds() {
        assert_eq!(
            parse_expiry(Some("900".into()), FALLBACK),
            Duration::from_secs(900)
        );
    }

    #[test]
    fn falls_back_on_missing_or_garbage() {
        assert_eq!(parse_expiry(None, FALLBACK), FALLBACK);
        assert_eq!(parse_expiry(Some("".into()), FALLBACK), FALLBACK);
        assert_eq!(parse_expiry(Some("  ".into()), FALLBACK), FALLBACK);
        assert_eq!(parse_expiry(Some("soon".into()), FALLBACK), FALLBACK);
        assert_eq!(parse_expiry(Some("15x".into()), FALLBACK), FALLBACK);
    }
}
