use serde::Deserialize;

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    payment: Payment,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_token_ttl_hours")]
    token_ttl_hours: i64,
}

/// Payment gateway credentials. `server_key` doubles as the webhook signing secret.
#[derive(Debug, Deserialize)]
pub struct Payment {
    server_key: String,
    snap_url: String,
    #[serde(default = "default_price")]
    default_price: i64,
    #[serde(default = "default_email_domain")]
    email_domain: String,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_price() -> i64 {
    100_000
}

fn default_email_domain() -> String {
    String::from("example.com")
}

impl Config {
    /// Reads and parses the configuration file. Called once at startup, the
    /// result is shared through `AppState`.
    #[tracing::instrument]
    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let bytes = read_config(use_local)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        Ok(config)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn payment(&self) -> &Payment {
        &self.payment
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn token_ttl_hours(&self) -> i64 {
        self.token_ttl_hours
    }
}

impl Payment {
    #[inline]
    pub fn server_key(&self) -> &str {
        &self.server_key
    }

    #[inline]
    pub fn snap_url(&self) -> &str {
        &self.snap_url
    }

    #[inline]
    pub fn default_price(&self) -> i64 {
        self.default_price
    }

    #[inline]
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }
}
