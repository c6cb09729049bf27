use crate::models::WindowMode;
use crate::utils::AppError;
use mongodb::bson::oid::ObjectId;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MongoDB,
    Memory,
}

/// JWT verification parameters
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt: JwtSettings,
    pub window_mode: WindowMode,
    pub cors_origins: Vec<String>,
    /// Users created at startup when running on the memory backend
    pub seed_user_ids: Vec<ObjectId>,
}

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:8081,http://127.0.0.1:3000,http://127.0.0.1:8081";

impl AppConfig {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3002")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("PORT is not a valid port: {}", e)))?;

        let storage = match var("STORAGE_BACKEND", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => StorageBackend::MongoDB,
            "memory" => StorageBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "Unknown STORAGE_BACKEND: {}. Supported: mongodb, memory",
                    other
                )))
            }
        };

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::MongoDB && database_url.is_none() {
            return Err(AppError::Config("DATABASE_URL must be set".to_string()));
        }

        let window_mode = var("REMINDER_WINDOW_MODE", "overlap")
            .parse::<WindowMode>()
            .map_err(AppError::Config)?;

        let cors_origins = var("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let seed_user_ids = var("SEED_USER_IDS", "")
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                ObjectId::parse_str(id)
                    .map_err(|e| AppError::Config(format!("SEED_USER_IDS entry {} is not an ObjectId: {}", id, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            storage,
            database_url,
            jwt: JwtSettings {
                secret: var("JWT_SECRET", "default-secret-change-me"),
                issuer: var("JWT_ISSUER", "calendar-service"),
                audience: var("JWT_AUDIENCE", "calendar-api"),
            },
            window_mode,
            cors_origins,
            seed_user_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_memory_backend() {
        let config = config_from(&[("STORAGE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.port, 3002);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.window_mode, WindowMode::Overlap);
        assert_eq!(config.jwt.issuer, "calendar-service");
        assert_eq!(config.cors_origins.len(), 4);
        assert!(config.seed_user_ids.is_empty());
    }

    #[test]
    fn test_seed_user_ids() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("SEED_USER_IDS", "64b7f0c2a1b2c3d4e5f60718, 64b7f0c2a1b2c3d4e5f60719"),
        ])
        .unwrap();
        assert_eq!(config.seed_user_ids.len(), 2);
        assert_eq!(config.seed_user_ids[1].to_hex(), "64b7f0c2a1b2c3d4e5f60719");

        assert!(config_from(&[("STORAGE_BACKEND", "memory"), ("SEED_USER_IDS", "nope")]).is_err());
    }

    #[test]
    fn test_mongodb_requires_database_url() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let config = config_from(&[("DATABASE_URL", "mongodb://localhost:27017/calendar")]).unwrap();
        assert_eq!(config.storage, StorageBackend::MongoDB);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("STORAGE_BACKEND", "memory"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "redis")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "memory"), ("REMINDER_WINDOW_MODE", "fuzzy")]).is_err());
    }

    #[test]
    fn test_legacy_window_and_origins() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("REMINDER_WINDOW_MODE", "legacy"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com, ,https://admin.example.com"),
        ])
        .unwrap();
        assert_eq!(config.window_mode, WindowMode::Legacy);
        assert_eq!(
            config.cors_origins,
            vec!["https://app.example.com".to_string(), "https://admin.example.com".to_string()]
        );
    }
}
