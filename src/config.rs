use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{declare::SourceMode, util::http::RequestOptions};

const CONFIG_PATH: &str = "app.json";

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const TELEGRAM_POLL_TIMEOUT_SECS: &str = "TELEGRAM_POLL_TIMEOUT_SECS";

const GOLD_SOURCE_MODE: &str = "GOLD_SOURCE_MODE";
const GOLD_CURRENCY: &str = "GOLD_CURRENCY";
const GOLD_HTML_URL: &str = "GOLD_HTML_URL";
const GOLD_JSON_URL: &str = "GOLD_JSON_URL";
const GOLD_TIMEOUT_SECS: &str = "GOLD_TIMEOUT_SECS";
const GOLD_RETRIES: &str = "GOLD_RETRIES";
const GOLD_LISTEN_KEYWORDS: &str = "GOLD_LISTEN_KEYWORDS";

const DEFAULT_HTML_URL: &str = "https://goldprice.org/gold-price-united-arab-emirates.html";
const DEFAULT_JSON_URL: &str = "https://data-asg.goldprice.org/dbXRates/{currency}";
const DEFAULT_CURRENCY: &str = "AED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingToken(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("failed to read configuration file: {0}")]
    Load(#[from] config::ConfigError),
}

/// Settings built once at startup and handed to the components that need them.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub bot: Bot,
    #[serde(default)]
    pub gold: Gold,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Bot {
    #[serde(default)]
    pub telegram: Telegram,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Telegram {
    #[serde(default)]
    pub token: String,
    /// getUpdates 長輪詢秒數
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for Telegram {
    fn default() -> Self {
        Telegram {
            token: String::new(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Gold {
    #[serde(default)]
    pub mode: SourceMode,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_html_url")]
    pub html_url: String,
    /// `{currency}` 會被替換成幣別代碼
    #[serde(default = "default_json_url")]
    pub json_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retries: usize,
    /// 未設定時，JSON 模式預設開啟關鍵字觸發
    #[serde(default)]
    pub listen_keywords: Option<bool>,
}

impl Default for Gold {
    fn default() -> Self {
        Gold {
            mode: SourceMode::default(),
            currency: default_currency(),
            html_url: default_html_url(),
            json_url: default_json_url(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            listen_keywords: None,
        }
    }
}

impl Gold {
    /// The upstream URL for the configured mode.
    pub fn endpoint(&self) -> String {
        match self.mode {
            SourceMode::Html => self.html_url.clone(),
            SourceMode::Json => self.json_url.replace("{currency}", &self.currency),
        }
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new(Duration::from_secs(self.timeout_secs), self.retries)
    }

    pub fn keywords_enabled(&self) -> bool {
        self.listen_keywords
            .unwrap_or(self.mode == SourceMode::Json)
    }
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_html_url() -> String {
    DEFAULT_HTML_URL.to_string()
}

fn default_json_url() -> String {
    DEFAULT_JSON_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl App {
    /// Reads `app.json` when present, then applies the process environment.
    pub fn get() -> Result<Self, ConfigError> {
        Self::load(&config_path(), |key| env::var(key).ok())
    }

    /// Same as [`App::get`] with an explicit file path and variable lookup.
    pub fn load<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = if path.exists() {
            config_config::builder()
                .add_source(config_file::from(path.to_path_buf()))
                .build()?
                .try_deserialize::<App>()?
        } else {
            App::default()
        };

        app.override_with(lookup)?.validate()
    }

    /// 將來自於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TELEGRAM_BOT_TOKEN) {
            self.bot.telegram.token = token;
        }

        if let Some(secs) = lookup(TELEGRAM_POLL_TIMEOUT_SECS) {
            self.bot.telegram.poll_timeout_secs = parse_value(TELEGRAM_POLL_TIMEOUT_SECS, &secs)?;
        }

        if let Some(mode) = lookup(GOLD_SOURCE_MODE) {
            self.gold.mode = parse_value(GOLD_SOURCE_MODE, &mode)?;
        }

        if let Some(currency) = lookup(GOLD_CURRENCY) {
            self.gold.currency = currency.trim().to_uppercase();
        }

        if let Some(url) = lookup(GOLD_HTML_URL) {
            self.gold.html_url = url;
        }

        if let Some(url) = lookup(GOLD_JSON_URL) {
            self.gold.json_url = url;
        }

        if let Some(secs) = lookup(GOLD_TIMEOUT_SECS) {
            self.gold.timeout_secs = parse_value(GOLD_TIMEOUT_SECS, &secs)?;
        }

        if let Some(retries) = lookup(GOLD_RETRIES) {
            self.gold.retries = parse_value(GOLD_RETRIES, &retries)?;
        }

        if let Some(listen) = lookup(GOLD_LISTEN_KEYWORDS) {
            self.gold.listen_keywords = Some(parse_value(GOLD_LISTEN_KEYWORDS, &listen)?);
        }

        Ok(self)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.bot.telegram.token.trim().is_empty() {
            return Err(ConfigError::MissingToken(TELEGRAM_BOT_TOKEN));
        }

        if self.gold.currency.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: GOLD_CURRENCY,
                value: self.gold.currency,
            });
        }

        if self.gold.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: GOLD_TIMEOUT_SECS,
                value: "0".to_string(),
            });
        }

        Ok(self)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
