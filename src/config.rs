use crate::application::recommend::DEFAULT_REASONING_LANGUAGE;
use crate::domain::auth::Credentials;
use crate::domain::catalog::Catalog;
use crate::domain::wallet::Balance;
use crate::error::{MarketError, Result};
use crate::infrastructure::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GeminiClient};
use crate::infrastructure::supabase::SupabaseClient;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::PathBuf;

/// Where accounts and appointments are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendKind {
    /// On this machine, in the state file (or RocksDB with `--db-path`).
    #[default]
    Local,
    /// In a hosted Supabase project.
    Supabase,
}

/// Settings shared by every command. Each can also come from the environment.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Storage backend for accounts and appointments
    #[arg(
        long,
        value_enum,
        env = "TUTORHUB_BACKEND",
        default_value_t = BackendKind::Local,
        global = true
    )]
    pub backend: BackendKind,

    /// JSON file holding the local session state
    #[arg(
        long,
        env = "TUTORHUB_STATE_FILE",
        default_value = "tutorhub-state.json",
        global = true
    )]
    pub state_file: PathBuf,

    /// Path to a RocksDB database for the local state (needs `storage-rocksdb`)
    #[arg(long, env = "TUTORHUB_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true, global = true)]
    pub supabase_anon_key: Option<String>,

    /// Account used to sign in to the hosted backend when there is no session
    #[arg(long, env = "TUTORHUB_EMAIL", global = true)]
    pub account_email: Option<String>,

    #[arg(long, env = "TUTORHUB_PASSWORD", hide_env_values = true, global = true)]
    pub account_password: Option<String>,

    /// Gemini API key, needed by `recommend`
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    pub gemini_endpoint: String,

    /// Language the recommendation's reasoning is written in
    #[arg(long, default_value = DEFAULT_REASONING_LANGUAGE, global = true)]
    pub reasoning_language: String,

    /// Wallet credit of newly created profiles
    #[arg(long, env = "TUTORHUB_STARTING_BALANCE", default_value = "300", global = true)]
    pub starting_balance: Decimal,

    /// JSON file with the tutor catalog (defaults to the built-in one)
    #[arg(long, env = "TUTORHUB_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,
}

impl Config {
    pub fn starting_balance(&self) -> Result<Balance> {
        if self.starting_balance < Decimal::ZERO {
            return Err(MarketError::ConfigError(
                "Starting balance must not be negative".to_string(),
            ));
        }
        Ok(Balance::new(self.starting_balance))
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.account_email, &self.account_password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    pub fn supabase(&self) -> Result<SupabaseClient> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Ok(SupabaseClient::new(url, key))
            }
            _ => Err(MarketError::ConfigError(
                "SUPABASE_URL and SUPABASE_ANON_KEY must be set for the supabase backend"
                    .to_string(),
            )),
        }
    }

    pub fn gemini(&self) -> Result<GeminiClient> {
        match &self.api_key {
            Some(key) if !key.is_empty() => Ok(GeminiClient::with_endpoint(
                &self.gemini_endpoint,
                key,
                &self.gemini_model,
            )),
            _ => Err(MarketError::ConfigError(
                "API_KEY must be set to ask for recommendations".to_string(),
            )),
        }
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::from_reader(File::open(path)?),
            None => Ok(Catalog::builtin()),
        }
    }
}
