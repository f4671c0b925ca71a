use crate::error::{Result, ScoutError};
use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub telegram_token: String,
    pub chats: BTreeMap<String, ChatConfig>,
    /// Zipcode -> neighborhood names shown in notifications
    #[serde(default)]
    pub neighborhoods: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub settings: ScoutSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub debug_group: bool,
    pub criteria: Criteria,
}

/// A subscriber's filter and rating rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Criteria {
    #[serde(default)]
    pub category: Category,
    /// Exclusive rent ceiling
    pub rent_until: u32,
    #[serde(default)]
    pub min_rooms: Option<u32>,
    #[serde(default)]
    pub min_space: Option<f64>,
    /// Empty means every zipcode is fine
    #[serde(default)]
    pub zipcode_whitelist: BTreeSet<u32>,
    /// Zipcodes that earn an offer a higher rating
    #[serde(default)]
    pub zipcode_preflist: BTreeSet<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// One shared ledger for every chat
    Global,
    #[default]
    PerChat,
}

impl DedupScope {
    /// Ledger scope for `chat_id`, `None` when shared
    pub fn scope_for<'a>(&self, chat_id: &'a str) -> Option<&'a str> {
        match self {
            DedupScope::Global => None,
            DedupScope::PerChat => Some(chat_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutSettings {
    pub listing_url: String,
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub ledger_path: PathBuf,
    pub dedup_scope: DedupScope,
    pub ledger_max_entries: Option<usize>,
    pub title_width: usize,
    pub source_label: String,
    pub telegram_api_base: String,
    pub request_timeout_secs: u64,
    pub max_consecutive_delivery_failures: u32,
}

impl Default for ScoutSettings {
    fn default() -> Self {
        Self {
            listing_url: "https://www.saga.hamburg/immobiliensuche?Kategorie=APARTMENT".to_string(),
            base_url: "https://www.saga.hamburg".to_string(),
            poll_interval_secs: 180,
            ledger_path: PathBuf::from("known_offers.txt"),
            dedup_scope: DedupScope::default(),
            ledger_max_entries: None,
            title_width: 28,
            source_label: "SAGA".to_string(),
            telegram_api_base: "https://api.telegram.org".to_string(),
            request_timeout_secs: 30,
            max_consecutive_delivery_failures: 5,
        }
    }
}

impl ScoutSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScoutError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(ScoutError::Config("telegram_token is empty".to_string()));
        }
        if self.settings.title_width < 3 {
            return Err(ScoutError::Config(format!(
                "title_width must be at least 3, got {}",
                self.settings.title_width
            )));
        }
        if self.settings.max_consecutive_delivery_failures == 0 {
            return Err(ScoutError::Config(
                "max_consecutive_delivery_failures must be positive".to_string(),
            ));
        }
        url::Url::parse(&self.settings.base_url)
            .map_err(|e| ScoutError::Config(format!("base_url: {}", e)))?;
        Ok(())
    }

    pub fn debug_chats(&self) -> impl Iterator<Item = &str> {
        self.chats
            .iter()
            .filter(|(_, chat)| chat.debug_group)
            .map(|(id, _)| id.as_str())
    }

    pub fn neighborhoods_for(&self, zipcode: u32) -> &[String] {
        self.neighborhoods
            .get(&zipcode.to_string())
            .map(|names| names.as_slice())
            .unwrap_or(&[])
    }
}
