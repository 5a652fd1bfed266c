use super::HubConfig;

/// Apply PIXELHUB_* environment variables on top of a loaded config.
///
/// Unparseable values are ignored and the file/default value is kept.
pub fn apply_env_overrides(config: &mut HubConfig) {
    apply_overrides_with(config, |key| std::env::var(key).ok());
}

/// Same as [`apply_env_overrides`] with an injectable variable source.
pub fn apply_overrides_with<F>(config: &mut HubConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("PIXELHUB_BIND_ADDR") {
        if !v.trim().is_empty() {
            config.server.bind_addr = v;
        }
    }
    if let Some(v) = lookup("PIXELHUB_CANVAS_WIDTH") {
        if let Ok(n) = v.parse::<u32>() {
            config.canvas.width = n;
        }
    }
    if let Some(v) = lookup("PIXELHUB_CANVAS_HEIGHT") {
        if let Ok(n) = v.parse::<u32>() {
            config.canvas.height = n;
        }
    }
    if let Some(v) = lookup("PIXELHUB_MAX_PIXELS") {
        if let Ok(n) = v.parse::<u32>() {
            config.economy.max_pixels = n;
        }
    }
    if let Some(v) = lookup("PIXELHUB_REGEN_INTERVAL_MS") {
        if let Ok(n) = v.parse::<u64>() {
            config.economy.regen_interval_ms = n;
        }
    }
    if let Some(v) = lookup("PIXELHUB_COOLDOWN_MS") {
        if let Ok(n) = v.parse::<u64>() {
            config.economy.cooldown_ms = n;
        }
    }
}
