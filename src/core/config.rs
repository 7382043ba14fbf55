use std::env;
use std::time::Duration;

use crate::features::posts::models::Coordinates;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub geocoder: GeocoderConfig,
    pub location: LocationConfig,
    pub map: MapConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Load the demo posts into an empty store on startup
    pub seed_demo_posts: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Nominatim geocoder settings
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Search bounding box as `min_lon,min_lat,max_lon,max_lat`
    pub viewbox: String,
    pub result_limit: u32,
}

/// Location capture settings used by the post forms
#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub geolocation_timeout: Duration,
    pub search_debounce: Duration,
    pub search_min_chars: usize,
    pub fallback_center: Coordinates,
    pub fallback_city: String,
}

/// Map session lifetime settings
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Sessions without an open event stream are dropped after this long unseen
    pub session_idle_ttl: Duration,
    pub reap_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            geocoder: GeocoderConfig::from_env()?,
            location: LocationConfig::from_env()?,
            map: MapConfig::from_env()?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid value", name)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let seed_demo_posts = parse_var("SEED_DEMO_POSTS", false)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            seed_demo_posts,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Crisis Map API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Community resource and help-request map".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl GeocoderConfig {
    const DEFAULT_BASE_URL: &'static str = "https://nominatim.openstreetmap.org";
    const DEFAULT_VIEWBOX: &'static str = "123.7,10.1,124.1,10.5";
    const DEFAULT_RESULT_LIMIT: u32 = 5;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("GEOCODER_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let user_agent = env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| "CrisisMapCore/0.1 (community-crisis-map)".to_string());
        let viewbox =
            env::var("GEOCODER_VIEWBOX").unwrap_or_else(|_| Self::DEFAULT_VIEWBOX.to_string());
        let result_limit = parse_var("GEOCODER_RESULT_LIMIT", Self::DEFAULT_RESULT_LIMIT)?;

        Ok(Self {
            base_url,
            user_agent,
            viewbox,
            result_limit,
        })
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            user_agent: "CrisisMapCore/0.1 (community-crisis-map)".to_string(),
            viewbox: Self::DEFAULT_VIEWBOX.to_string(),
            result_limit: Self::DEFAULT_RESULT_LIMIT,
        }
    }
}

impl LocationConfig {
    const DEFAULT_GEOLOCATION_TIMEOUT_SECS: u64 = 7;
    const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
    const DEFAULT_SEARCH_MIN_CHARS: usize = 3;

    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let geolocation_timeout = Duration::from_secs(parse_var(
            "GEOLOCATION_TIMEOUT_SECS",
            Self::DEFAULT_GEOLOCATION_TIMEOUT_SECS,
        )?);
        let search_debounce = Duration::from_millis(parse_var(
            "SEARCH_DEBOUNCE_MS",
            Self::DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let search_min_chars = parse_var("SEARCH_MIN_CHARS", Self::DEFAULT_SEARCH_MIN_CHARS)?;

        let latitude = parse_var("FALLBACK_LAT", defaults.fallback_center.latitude)?;
        let longitude = parse_var("FALLBACK_LON", defaults.fallback_center.longitude)?;
        let fallback_center = Coordinates::new(latitude, longitude)
            .ok_or_else(|| "FALLBACK_LAT/FALLBACK_LON must be a valid coordinate".to_string())?;
        let fallback_city = env::var("FALLBACK_CITY").unwrap_or(defaults.fallback_city);

        Ok(Self {
            geolocation_timeout,
            search_debounce,
            search_min_chars,
            fallback_center,
            fallback_city,
        })
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            geolocation_timeout: Duration::from_secs(Self::DEFAULT_GEOLOCATION_TIMEOUT_SECS),
            search_debounce: Duration::from_millis(Self::DEFAULT_SEARCH_DEBOUNCE_MS),
            search_min_chars: Self::DEFAULT_SEARCH_MIN_CHARS,
            fallback_center: Coordinates::CEBU_CITY,
            fallback_city: "Cebu City".to_string(),
        }
    }
}

impl MapConfig {
    const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 600; // 10 minutes
    const DEFAULT_REAP_INTERVAL_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            session_idle_ttl: Duration::from_secs(parse_var(
                "MAP_SESSION_IDLE_TTL_SECS",
                Self::DEFAULT_SESSION_IDLE_TTL_SECS,
            )?),
            reap_interval: Duration::from_secs(parse_var(
                "MAP_SESSION_REAP_INTERVAL_SECS",
                Self::DEFAULT_REAP_INTERVAL_SECS,
            )?),
        })
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            session_idle_ttl: Duration::from_secs(Self::DEFAULT_SESSION_IDLE_TTL_SECS),
            reap_interval: Duration::from_secs(Self::DEFAULT_REAP_INTERVAL_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("admin:secret".to_string()));
    }

    #[test]
    fn test_location_defaults_point_at_city_center() {
        let config = LocationConfig::default();
        assert_eq!(config.fallback_center, Coordinates::CEBU_CITY);
        assert_eq!(config.geolocation_timeout, Duration::from_secs(7));
        assert_eq!(config.search_min_chars, 3);
    }
}
