use serde::{Deserialize, Serialize};

/// Top-level kiosk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub api_base_url: String,
    pub voice: VoiceConfig,
    pub timings: Timings,
    pub debug: bool,
    /// Device label sent when a session is opened
    pub device: String,
    /// Wall-clock offset from UTC used for calendar dates (product codes, "today" in reports)
    pub utc_offset_minutes: i32,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            voice: VoiceConfig::default(),
            timings: Timings::default(),
            debug: false,
            device: "web".to_string(),
            utc_offset_minutes: LIMA_UTC_OFFSET_MINUTES,
        }
    }
}

impl KioskConfig {
    /// Base URL without a trailing slash, ready for endpoint concatenation.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "es-ES".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Timer settings, all in milliseconds unless noted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub inactivity_ms: u64,
    pub voice_timeout_ms: u64,
    /// Number of one-second ticks on the farewell screen
    pub farewell_ticks: u32,
    pub diagnosis_delay_ms: u64,
    pub stats_refresh_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            inactivity_ms: 300_000,
            voice_timeout_ms: 10_000,
            farewell_ticks: 5,
            diagnosis_delay_ms: 2_000,
            stats_refresh_ms: 30_000,
        }
    }
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const BACKEND_PORT: u16 = 5000;
/// America/Lima has no daylight saving: UTC-5 all year
pub const LIMA_UTC_OFFSET_MINUTES: i32 = -300;
