use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub registry: RegistryConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            workspace: WorkspaceConfig::from_env(),
            registry: RegistryConfig::from_env(),
            auth: AuthConfig::from_env(),
            database: DatabaseConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:    {}:{}", self.server.host, self.server.port);
        tracing::info!("  modules:   work_dir={}", self.workspace.work_dir.display());
        tracing::info!(
            "  checkout:  retention={}d, sweep every {}h",
            self.workspace.retention_days,
            self.workspace.sweep_interval_hours
        );
        tracing::info!("  registry:  modules={}", self.registry.module_url);
        tracing::info!("  auth:      configured={}", self.auth.is_configured());
        tracing::info!("  database:  configured={}", self.database.is_configured());
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL scheduled executions are triggered through. Defaults to the
    /// local listen address.
    pub public_url: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");
        let port = env_u16("PORT", 3010);
        let public_url = env_or("PUBLIC_URL", &format!("http://127.0.0.1:{}", port));
        Self {
            host,
            port,
            public_url,
        }
    }
}

// ── Module workspace ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory for materialized module checkouts.
    pub work_dir: PathBuf,
    /// Checkouts unused longer than this many days are eligible for removal.
    pub retention_days: u32,
    /// Hours between cleanup sweeps.
    pub sweep_interval_hours: u64,
}

impl WorkspaceConfig {
    fn from_env() -> Self {
        Self {
            work_dir: PathBuf::from(env_or("MODULE_WORK_DIR", "data/modules")),
            retention_days: env_u32("CHECKOUT_RETENTION_DAYS", 7),
            sweep_interval_hours: env_u64("SWEEP_INTERVAL_HOURS", 24),
        }
    }
}

// ── Collaborator registries ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub module_url: String,
    pub site_url: String,
    pub plugin_url: String,
}

impl RegistryConfig {
    fn from_env() -> Self {
        Self {
            module_url: env_or("MODULE_REGISTRY_URL", "http://localhost:3002"),
            site_url: env_or("SITE_SERVICE_URL", "http://localhost:3003"),
            plugin_url: env_or("PLUGIN_SERVICE_URL", "http://localhost:3004"),
        }
    }
}

// ── Service-to-service auth ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_url: String,
    pub service_id: Option<String>,
    pub service_secret: Option<String>,
}

impl AuthConfig {
    fn from_env() -> Self {
        Self {
            token_url: env_or("AUTH_TOKEN_URL", "http://localhost:3001/auth/service-token"),
            service_id: env_opt("SERVICE_ID"),
            service_secret: env_opt("SERVICE_SECRET"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service_id.is_some() && self.service_secret.is_some()
    }
}

// ── Database ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string; results are kept in memory when absent.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn from_env() -> Self {
        Self {
            url: env_opt("DATABASE_URL"),
            max_connections: env_u32("DATABASE_MAX_CONNECTIONS", 5),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
