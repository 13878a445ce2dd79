//! Configuration: one explicit object constructed at process start and
//! passed by reference into the driver, scheduler, and gateway. No ambient
//! environment reads inside business logic.

use crate::cycle::{RewriteMode, Target};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wordpress: WordPressConfig,
    pub engine: EngineConfig,
    /// Pages in scope for a refresh sweep. Fixed for the lifetime of a run.
    pub targets: Vec<Target>,
    pub schedule: ScheduleConfig,
    pub rewrite: RewriteConfig,
    pub gateway: GatewayConfig,
    pub templates: TemplateOverrides,
    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPressConfig {
    pub base_url: String,
    pub username: String,
    pub app_password: String,
    pub timeout_secs: u64,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            app_password: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub warmup_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 600,
            warmup_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub mode: RewriteMode,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            cors_origins: Vec::new(),
        }
    }
}

/// Per-mode instruction template overrides. Absent entries fall back to the
/// built-in templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOverrides {
    pub html: Option<String>,
    pub css: Option<String>,
    pub advisory_json: Option<String>,
}

impl TemplateOverrides {
    pub fn instructions_for(&self, mode: RewriteMode) -> Option<&str> {
        match mode {
            RewriteMode::Html => self.html.as_deref(),
            RewriteMode::Css => self.css.as_deref(),
            RewriteMode::AdvisoryJson => self.advisory_json.as_deref(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_at(&home.join(".pagesmith"))
    }

    pub fn load_or_init_at(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.toml");

        if !dir.exists() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&config_path);
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Override logic with the environment lookup factored out so tests can
    /// drive it without touching process globals.
    pub fn apply_overrides_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        let nonempty = |name: &str| var(name).filter(|value| !value.is_empty());

        if let Some(base_url) = nonempty("WP_BASE_URL") {
            self.wordpress.base_url = base_url;
        }
        if let Some(username) = nonempty("WP_USERNAME") {
            self.wordpress.username = username;
        }
        if let Some(password) = nonempty("WP_APP_PASSWORD") {
            self.wordpress.app_password = password;
        }

        if let Some(ids) = nonempty("WP_PAGE_IDS") {
            let targets: Vec<Target> = ids
                .split(',')
                .filter_map(|part| {
                    let part = part.trim();
                    let (id, name) = match part.split_once(':') {
                        Some((id, name)) => (id.trim(), Some(name.trim())),
                        None => (part, None),
                    };
                    let id: u64 = id.parse().ok()?;
                    Some(Target::new(
                        id,
                        name.map_or_else(|| format!("page-{id}"), ToString::to_string),
                    ))
                })
                .collect();
            if !targets.is_empty() {
                self.targets = targets;
            }
        } else if let Some(id) = nonempty("WP_HOMEPAGE_ID").and_then(|raw| raw.parse().ok()) {
            self.targets = vec![Target::new(id, "Homepage")];
        }

        if let Some(key) = nonempty("OPENAI_API_KEY") {
            self.engine.api_key = Some(key);
        }
        if let Some(model) = nonempty("OPENAI_MODEL") {
            self.engine.model = model;
        }
        if let Some(base_url) = nonempty("PAGESMITH_ENGINE_BASE_URL") {
            self.engine.base_url = base_url;
        }
        if let Some(temp) = nonempty("PAGESMITH_TEMPERATURE").and_then(|raw| raw.parse().ok())
            && (0.0..=2.0).contains(&temp)
        {
            self.engine.temperature = temp;
        }

        if let Some(secs) = nonempty("PAGESMITH_INTERVAL_SECS").and_then(|raw| raw.parse().ok()) {
            self.schedule.interval_secs = secs;
        }
        if let Some(secs) = nonempty("PAGESMITH_WARMUP_SECS").and_then(|raw| raw.parse().ok()) {
            self.schedule.warmup_secs = secs;
        }

        if let Some(mode) = nonempty("PAGESMITH_MODE").and_then(|raw| raw.parse().ok()) {
            self.rewrite.mode = mode;
        }
        if let Some(language) = nonempty("PAGESMITH_LANGUAGE") {
            self.rewrite.language = Some(language);
        }

        if let Some(host) = nonempty("PAGESMITH_GATEWAY_HOST").or_else(|| nonempty("HOST")) {
            self.gateway.host = host;
        }
        if let Some(port) = nonempty("PAGESMITH_GATEWAY_PORT")
            .or_else(|| nonempty("PORT"))
            .and_then(|raw| raw.parse().ok())
        {
            self.gateway.port = port;
        }
    }

    /// Startup validation. Missing required configuration is the only fatal
    /// condition in the process.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.wordpress.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "wordpress.base_url is required (set WP_BASE_URL)".into(),
            ));
        }
        Url::parse(&self.wordpress.base_url).map_err(|e| {
            ConfigError::Validation(format!("wordpress.base_url is not a valid URL: {e}"))
        })?;

        if self.wordpress.username.trim().is_empty()
            || self.wordpress.app_password.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "WordPress credentials are required (set WP_USERNAME and WP_APP_PASSWORD)".into(),
            ));
        }

        if self
            .engine
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "engine.api_key is required (set OPENAI_API_KEY)".into(),
            ));
        }

        if self.targets.is_empty() {
            return Err(ConfigError::Validation(
                "at least one target page is required (set WP_PAGE_IDS or edit config.toml)".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> Config {
        Config {
            wordpress: WordPressConfig {
                base_url: "https://example.com".into(),
                username: "admin".into(),
                app_password: "app-pass".into(),
                ..WordPressConfig::default()
            },
            engine: EngineConfig {
                api_key: Some("sk-test".into()),
                ..EngineConfig::default()
            },
            targets: vec![Target::new(195, "Homepage")],
            ..Config::default()
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.schedule.interval_secs, 600);
        assert_eq!(config.schedule.warmup_secs, 5);
        assert_eq!(config.rewrite.mode, RewriteMode::Html);
        assert_eq!(config.gateway.port, 4000);
        assert_eq!(config.engine.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_base_url() {
        let mut config = valid_config();
        config.wordpress.base_url.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("WP_BASE_URL"));
    }

    #[test]
    fn validate_rejects_unparseable_base_url() {
        let mut config = valid_config();
        config.wordpress.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_api_key() {
        let mut config = valid_config();
        config.engine.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn validate_rejects_empty_target_list() {
        let mut config = valid_config();
        config.targets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_wordpress_credentials() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[
            ("WP_BASE_URL", "https://site.example"),
            ("WP_USERNAME", "editor"),
            ("WP_APP_PASSWORD", "xyzw abcd"),
        ]));
        assert_eq!(config.wordpress.base_url, "https://site.example");
        assert_eq!(config.wordpress.username, "editor");
        assert_eq!(config.wordpress.app_password, "xyzw abcd");
    }

    #[test]
    fn homepage_id_defines_single_target() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("WP_HOMEPAGE_ID", "195")]));
        assert_eq!(config.targets, vec![Target::new(195, "Homepage")]);
    }

    #[test]
    fn page_ids_parse_with_optional_names() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("WP_PAGE_IDS", "195:Homepage, 201, junk")]));
        assert_eq!(
            config.targets,
            vec![Target::new(195, "Homepage"), Target::new(201, "page-201")]
        );
    }

    #[test]
    fn page_ids_take_precedence_over_homepage_id() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[
            ("WP_PAGE_IDS", "7:Landing"),
            ("WP_HOMEPAGE_ID", "195"),
        ]));
        assert_eq!(config.targets, vec![Target::new(7, "Landing")]);
    }

    #[test]
    fn mode_and_language_override() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[
            ("PAGESMITH_MODE", "advisory-json"),
            ("PAGESMITH_LANGUAGE", "Arabic"),
        ]));
        assert_eq!(config.rewrite.mode, RewriteMode::AdvisoryJson);
        assert_eq!(config.rewrite.language.as_deref(), Some("Arabic"));
    }

    #[test]
    fn out_of_range_temperature_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("PAGESMITH_TEMPERATURE", "9.5")]));
        assert_eq!(config.engine.temperature, 0.0);
    }

    #[test]
    fn generic_port_env_is_honored() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("PORT", "8080")]));
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("WP_BASE_URL", "")]));
        assert_eq!(config.wordpress.base_url, "");
    }

    #[test]
    fn load_or_init_creates_and_reloads_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagesmith");

        let mut created = Config::load_or_init_at(&path).unwrap();
        assert!(path.join("config.toml").exists());

        created.wordpress.base_url = "https://example.com".into();
        created.targets = vec![Target::new(195, "Homepage")];
        created.save().unwrap();

        let reloaded = Config::load_or_init_at(&path).unwrap();
        assert_eq!(reloaded.wordpress.base_url, "https://example.com");
        assert_eq!(reloaded.targets, vec![Target::new(195, "Homepage")]);
    }
}
