//! Process settings from environment variables (a `.env` file is loaded first by the binary).

use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/courses";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_MAX_STUDENTS_PER_COURSE: u32 = 20;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// Mount point of resource routes; empty mounts them at the root.
    pub api_prefix: String,
    pub db_max_connections: u32,
    pub max_students_per_course: u32,
    pub body_limit_bytes: usize,
    /// Optional JSON declarations replacing the built-in course catalog.
    pub models_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            api_prefix: DEFAULT_API_PREFIX.into(),
            db_max_connections: 5,
            max_students_per_course: DEFAULT_MAX_STUDENTS_PER_COURSE,
            body_limit_bytes: 1024 * 1024,
            models_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        if let Some(v) = lookup("DATABASE_URL") {
            s.database_url = v;
        }
        if let Some(v) = lookup("BIND_ADDR") {
            s.bind_addr = v;
        }
        if let Some(v) = lookup("API_PREFIX") {
            s.api_prefix = normalize_prefix(&v);
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            s.db_max_connections = parse_number("DB_MAX_CONNECTIONS", &v)?;
            if s.db_max_connections == 0 {
                return Err(ConfigError::InvalidSetting {
                    name: "DB_MAX_CONNECTIONS",
                    value: v,
                });
            }
        }
        if let Some(v) = lookup("MAX_STUDENTS_PER_COURSE") {
            s.max_students_per_course = parse_number("MAX_STUDENTS_PER_COURSE", &v)?;
        }
        if let Some(v) = lookup("BODY_LIMIT_BYTES") {
            s.body_limit_bytes = parse_number("BODY_LIMIT_BYTES", &v)?;
        }
        s.models_path = lookup("MODELS_PATH").filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        Ok(s)
    }

    /// In-memory SQLite with a single pooled connection, for tests.
    pub fn for_testing() -> Self {
        Settings {
            database_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            ..Settings::default()
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
        name,
        value: value.to_string(),
    })
}

/// "/api/v1/" and "api/v1" both become "/api/v1"; "/" becomes "".
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
