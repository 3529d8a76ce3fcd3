//! Session configuration loaded from `dartify.toml`.

use std::path::Path;

use serde::Deserialize;

use crate::engine::models::{GameOptions, GameType};

/// `[game]` table: variant, finishing rule and the starting roster.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub game_type: GameType,
    #[serde(default = "default_true")]
    pub double_out: bool,
    #[serde(default)]
    pub players: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_type: GameType::X501,
            double_out: true,
            players: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn options(&self) -> GameOptions {
        GameOptions { double_out: self.double_out }
    }
}

/// Which simulated thrower feeds the detector.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Random,
    #[default]
    Checkout,
}

impl StrategyKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "random" => Some(StrategyKind::Random),
            "checkout" => Some(StrategyKind::Checkout),
            _ => None,
        }
    }
}

/// `[detector]` table for the simulated camera feed.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DetectorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    pub seed: Option<u64>,
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_interval_ms(),
            seed: None,
            strategy: StrategyKind::default(),
            accuracy: default_accuracy(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    1500
}

fn default_accuracy() -> f64 {
    0.6
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct DartifyConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

/// Parse a config document.
pub fn parse_config(content: &str) -> Result<DartifyConfig, String> {
    let config: DartifyConfig = toml::from_str(content).map_err(|e| e.to_string())?;
    if !(0.0..=1.0).contains(&config.detector.accuracy) {
        return Err(format!(
            "detector.accuracy must be between 0 and 1, got {}",
            config.detector.accuracy
        ));
    }
    if config.detector.interval_ms == 0 {
        return Err("detector.interval_ms must be positive".into());
    }
    Ok(config)
}

/// Load the config from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<DartifyConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_config(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try the well-known paths, returning built-in defaults if none loads.
pub fn load_default_config() -> DartifyConfig {
    let candidates = [
        "dartify.toml",
        "../dartify.toml",
        "/etc/dartify/dartify.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(
                        path = %p.display(),
                        game_type = %config.game.game_type,
                        players = config.game.players.len(),
                        "loaded dartify config"
                    );
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load dartify config");
                }
            }
        }
    }
    tracing::info!("no dartify.toml found, using built-in defaults");
    DartifyConfig::default()
}
