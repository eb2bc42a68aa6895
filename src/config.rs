use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

use crate::auth::Credentials;

/// The env vars the booker needs. Credentials are required; everything else
/// has a default.
#[derive(Debug, Deserialize)]
struct BookerEnv {
    username: String,
    client_id: String,
    password: String,
    #[serde(default = "default_state_path")]
    state_path: String,
    #[serde(default = "default_debug_err")]
    debug_err: bool,
    #[serde(default)]
    debug_all: bool,
}

fn default_state_path() -> String {
    "state.json".to_string()
}

fn default_debug_err() -> bool {
    true
}

pub struct BookerConfig {
    username: String,
    client_id: String,
    password: String,
    pub state_path: String,
    pub debug_err: bool,
    pub debug_all: bool,
}

impl BookerConfig {
    pub fn new() -> anyhow::Result<Self> {
        let env = BookerEnv::load_from_env()?;
        Ok(Self {
            username: env.username,
            client_id: env.client_id,
            password: env.password,
            state_path: env.state_path,
            debug_err: env.debug_err,
            debug_all: env.debug_all,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            client_id: self.client_id.clone(),
            password: self.password.clone(),
        }
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
