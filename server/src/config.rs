use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::DEFAULT_SESSION_TTL_SECS;

/// Effective server configuration, after every layer has been merged.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub json_logs: bool,
    pub generate_config: bool,
    /// Data directory for the database and the generated session key
    pub data_dir: String,
    /// Directory uploaded photos are written to (served at /uploads)
    pub uploads_dir: String,
    /// Session signing secret. A random key is generated in data_dir if unset.
    pub session_secret: Option<String>,
    pub session_ttl_secs: i64,
    /// Maximum request body size in megabytes (bounds photo uploads)
    pub max_upload_size_mb: u32,
    /// Only the owner may edit a post (deletes are always owner-only)
    pub require_owner_for_post_edit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            uploads_dir: "./public/uploads".to_string(),
            session_secret: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_upload_size_mb: 10,
            require_owner_for_post_edit: false,
        }
    }
}

/// Mini social feed server
///
/// Flags left off the command line are not serialized, so they never mask
/// values coming from the TOML file or the environment.
#[derive(Parser, Serialize, Clone, Debug)]
#[command(name = "mini-server", version, about = "Mini social feed server")]
pub struct Cli {
    /// Port to listen on [default: 3000]
    #[arg(long, env = "MINI_PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address [default: 0.0.0.0]
    #[arg(long, env = "MINI_BIND_ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file
    #[arg(long, default_value = "./mini.toml")]
    #[serde(skip)]
    pub config: String,

    /// Enable structured JSON logging
    #[arg(long, env = "MINI_JSON_LOGS")]
    #[serde(skip_serializing_if = "is_false")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub generate_config: bool,

    /// Data directory for the database and the generated session key [default: ./data]
    #[arg(long, env = "MINI_DATA_DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// Directory uploaded photos are written to [default: ./public/uploads]
    #[arg(long, env = "MINI_UPLOADS_DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploads_dir: Option<String>,

    /// Session signing secret. A random key is generated in data_dir if unset.
    #[arg(long, env = "MINI_SESSION_SECRET")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,

    /// Session token lifetime in seconds [default: 604800]
    #[arg(long, env = "MINI_SESSION_TTL_SECS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl_secs: Option<i64>,

    /// Maximum request body size in megabytes [default: 10]
    #[arg(long, env = "MINI_MAX_UPLOAD_SIZE_MB")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_size_mb: Option<u32>,

    /// Only the owner may edit a post (deletes are always owner-only)
    #[arg(long, env = "MINI_REQUIRE_OWNER_FOR_POST_EDIT")]
    #[serde(skip_serializing_if = "is_false")]
    pub require_owner_for_post_edit: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (MINI_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(Cli::parse()).extract()
    }

    pub fn figment(cli: Cli) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&cli.config))
            .merge(Env::prefixed("MINI_"))
            .merge(Serialized::defaults(cli))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb as usize * 1024 * 1024
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Mini Server Configuration
# Place this file at ./mini.toml or specify with --config <path>
# All settings can be overridden via environment variables (MINI_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 3000)
# port = 3000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging
# json_logs = false

# Data directory for the SQLite database and the generated session key
# data_dir = "./data"

# Directory uploaded photos are written to, served under /uploads
# uploads_dir = "./public/uploads"

# Session signing secret. Leave unset to use a random key stored in data_dir.
# session_secret = ""

# Session token lifetime in seconds (default: 604800 = 7 days)
# session_ttl_secs = 604800

# Maximum request body size in megabytes (default: 10)
# max_upload_size_mb = 10

# Restrict post edits to the post owner (default: false)
# require_owner_for_post_edit = false
"#
    .to_string()
}
