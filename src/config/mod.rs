pub mod env;
pub use env::apply_env_overrides;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Complete PixelHub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Canvas geometry and color policy
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Accept only palette colors (otherwise any #RGB / #RRGGBB value)
    #[serde(default)]
    pub palette_only: bool,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            palette_only: false,
        }
    }
}

/// Pixel economy constants
#[derive(Debug, Clone, Deserialize)]
pub struct EconomyConfig {
    /// Budget ceiling per participant
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u32,
    /// One pixel regenerates every interval while below the ceiling
    #[serde(default = "default_regen_interval_ms")]
    pub regen_interval_ms: u64,
    /// Minimum spacing between two accepted draws from one participant
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// How often the background ticker runs regeneration
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_max_pixels() -> u32 {
    15
}

fn default_regen_interval_ms() -> u64 {
    5000
}

fn default_cooldown_ms() -> u64 {
    100
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl EconomyConfig {
    pub fn regen_interval(&self) -> Duration {
        Duration::from_millis(self.regen_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            max_pixels: default_max_pixels(),
            regen_interval_ms: default_regen_interval_ms(),
            cooldown_ms: default_cooldown_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Chat limits
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    #[serde(default = "default_max_identity_len")]
    pub max_identity_len: usize,
    /// Recent public messages replayed to a joining participant
    #[serde(default = "default_history_replay")]
    pub history_replay: usize,
}

fn default_max_message_len() -> usize {
    500
}

fn default_max_identity_len() -> usize {
    32
}

fn default_history_replay() -> usize {
    50
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
            max_identity_len: default_max_identity_len(),
            history_replay: default_history_replay(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            canvas: CanvasConfig::default(),
            economy: EconomyConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl HubConfig {
    /// Reject settings the coordination core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            bail!(
                "canvas dimensions must be non-zero (got {}x{})",
                self.canvas.width,
                self.canvas.height
            );
        }
        if self.economy.max_pixels == 0 {
            bail!("economy.max_pixels must be at least 1");
        }
        if self.economy.regen_interval_ms == 0 || self.economy.tick_interval_ms == 0 {
            bail!("economy intervals must be non-zero");
        }
        if self.economy.tick_interval_ms > self.economy.regen_interval_ms {
            bail!(
                "economy.tick_interval_ms ({}) must not exceed regen_interval_ms ({})",
                self.economy.tick_interval_ms,
                self.economy.regen_interval_ms
            );
        }
        if self.chat.max_identity_len == 0 || self.chat.max_message_len == 0 {
            bail!("chat length limits must be non-zero");
        }
        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<HubConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path))?;
    let config: HubConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path))?;
    Ok(config)
}
