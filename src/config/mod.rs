//! Configuration module for the rug atelier backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A configured admin session: the admin it belongs to and its secret token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin_id: String,
    pub token: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory where uploaded files are stored
    pub upload_dir: PathBuf,
    /// Public base URL of the site, used to build upload URLs
    pub base_url: String,
    /// Maximum accepted size of a single uploaded file
    pub max_upload_bytes: usize,
    /// Admin session tokens accepted by the session verifier
    pub admin_sessions: Vec<AdminSession>,
    /// Address that receives lead notifications
    pub admin_email: String,
    /// Sender address for outgoing mail
    pub from_email: String,
    /// Reply-to address for outgoing mail
    pub reply_to_email: String,
    /// Booking link shown in site settings defaults
    pub calendly_url: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bind_addr = parse_bind_addr(env::var("RUGS_BIND_ADDR").ok());

        let db_path = env::var("RUGS_DB_PATH")
            .unwrap_or_else(|_| "./data/rugs.sqlite".to_string())
            .into();

        let upload_dir = env::var("RUGS_UPLOAD_DIR")
            .unwrap_or_else(|_| "./data/uploads".to_string())
            .into();

        let base_url = env::var("RUGS_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = parse_max_upload_bytes(env::var("RUGS_MAX_UPLOAD_BYTES").ok());

        let admin_sessions = env::var("RUGS_ADMIN_SESSIONS")
            .map(|raw| parse_admin_sessions(&raw))
            .unwrap_or_default();

        let admin_email =
            env::var("RUGS_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
        let from_email =
            env::var("RUGS_FROM_EMAIL").unwrap_or_else(|_| "noreply@example.com".to_string());
        let reply_to_email =
            env::var("RUGS_REPLY_TO_EMAIL").unwrap_or_else(|_| "hello@example.com".to_string());
        let calendly_url = env::var("RUGS_CALENDLY_URL").ok().filter(|s| !s.is_empty());

        let log_level = log_level_from_env();

        Self {
            bind_addr,
            db_path,
            upload_dir,
            base_url,
            max_upload_bytes,
            admin_sessions,
            admin_email,
            from_email,
            reply_to_email,
            calendly_url,
            log_level,
        }
    }
}

/// Log level from `RUGS_LOG_LEVEL` (after loading `.env`).
///
/// Read on its own so logging can be installed before the rest of the
/// configuration is parsed and its fallback warnings are emitted.
pub fn log_level_from_env() -> String {
    dotenvy::dotenv().ok();
    env::var("RUGS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn parse_bind_addr(raw: Option<String>) -> SocketAddr {
    raw.and_then(|raw| match raw.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            tracing::warn!("Invalid RUGS_BIND_ADDR {:?}, using default", raw);
            None
        }
    })
    .unwrap_or_else(default_bind_addr)
}

fn parse_max_upload_bytes(raw: Option<String>) -> usize {
    raw.and_then(|raw| match raw.parse() {
        Ok(bytes) => Some(bytes),
        Err(_) => {
            tracing::warn!("Invalid RUGS_MAX_UPLOAD_BYTES {:?}, using default", raw);
            None
        }
    })
    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
}

/// Parse `adminId:token` pairs separated by commas. Malformed entries are skipped.
pub fn parse_admin_sessions(raw: &str) -> Vec<AdminSession> {
    raw.split(',')
        .filter_map(|entry| {
            let (admin_id, token) = entry.trim().split_once(':')?;
            let (admin_id, token) = (admin_id.trim(), token.trim());
            if admin_id.is_empty() || token.is_empty() {
                tracing::warn!("Skipping malformed admin session entry");
                return None;
            }
            Some(AdminSession {
                admin_id: admin_id.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}
