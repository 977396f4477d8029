use serde::{Deserialize, Serialize};

pub const DEFAULT_URL_TEMPLATE: &str = "https://static-maps.yandex.ru/1.x/?ll={lon},{lat}&z={zoom}&size={width},{height}&l=map&pt={lon},{lat},pm2rdl";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    pub enabled: bool,
    /// Placeholders: `{lat}`, `{lon}`, `{zoom}`, `{width}`, `{height}`
    pub url_template: String,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            zoom: 16,
            width: 600,
            height: 300,
            timeout_secs: 10,
        }
    }
}
