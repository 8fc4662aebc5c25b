use bracket_layout::DEFAULT_STROKE_WEIGHT;
use bracket_layout::source::MatchSource;
use log::LevelFilter;
use std::time::Duration;

pub const DEFAULT_BOX_WIDTH: u16 = 24;
pub const DEFAULT_BOX_HEIGHT: u16 = 5;
/// Borders plus one content row.
pub const MIN_BOX_SIZE: u16 = 3;
const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub source: MatchSource,
    pub stroke_weight: u16,
    pub box_width: u16,
    pub box_height: u16,
    /// `None` turns periodic reloading off.
    pub refresh_interval: Option<Duration>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Error,
            source: MatchSource::Embedded,
            stroke_weight: DEFAULT_STROKE_WEIGHT,
            box_width: DEFAULT_BOX_WIDTH,
            box_height: DEFAULT_BOX_HEIGHT,
            refresh_interval: Some(Duration::from_secs(DEFAULT_REFRESH_SECS)),
        }
    }
}

impl AppSettings {
    /// Defaults overridden by `BRACKET_*` environment variables. Values that
    /// don't parse are ignored.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(source) = var("BRACKET_SOURCE") {
            settings.source = MatchSource::from_arg(&source);
        }
        if let Some(level) = var("BRACKET_LOG_LEVEL").and_then(|v| v.parse().ok()) {
            settings.log_level = level;
        }
        if let Some(weight) = var("BRACKET_STROKE_WEIGHT").and_then(|v| v.parse().ok()) {
            settings.stroke_weight = weight;
        }
        if let Some(width) = var("BRACKET_BOX_WIDTH").and_then(|v| v.parse::<u16>().ok()) {
            settings.box_width = width.max(MIN_BOX_SIZE);
        }
        if let Some(height) = var("BRACKET_BOX_HEIGHT").and_then(|v| v.parse::<u16>().ok()) {
            settings.box_height = height.max(MIN_BOX_SIZE);
        }
        if let Some(secs) = var("BRACKET_REFRESH_SECS").and_then(|v| v.parse::<u64>().ok()) {
            settings.refresh_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        settings
    }
}
