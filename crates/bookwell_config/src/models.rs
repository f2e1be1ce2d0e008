// --- File: crates/bookwell_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via APP_DATABASE__URL or DATABASE_URL
}

// --- Google Calendar Config ---
// Holds the service-account key location for the busy-time provider.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>,
}

// --- Reminders Config ---
// Thresholds and per-kind switches for the reminder batch. The trigger token
// gates the HTTP endpoint that runs it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemindersConfig {
    // Secret loaded via APP_REMINDERS__TRIGGER_TOKEN or REMINDER_TRIGGER_TOKEN
    pub trigger_token: Option<String>,
    #[serde(default = "default_rsvp_first_hours")]
    pub rsvp_first_hours: i64,
    #[serde(default = "default_rsvp_second_hours")]
    pub rsvp_second_hours: i64,
    /// Half-width of the tolerance window around the 24h/1h marks, in
    /// minutes. Covers irregular trigger cadence.
    #[serde(default = "default_tolerance_minutes")]
    pub session_tolerance_minutes: i64,
    #[serde(default = "default_true")]
    pub enable_rsvp_first: bool,
    #[serde(default = "default_true")]
    pub enable_rsvp_second: bool,
    #[serde(default = "default_true")]
    pub enable_session_24h: bool,
    #[serde(default = "default_true")]
    pub enable_session_1h: bool,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            trigger_token: None,
            rsvp_first_hours: default_rsvp_first_hours(),
            rsvp_second_hours: default_rsvp_second_hours(),
            session_tolerance_minutes: default_tolerance_minutes(),
            enable_rsvp_first: true,
            enable_rsvp_second: true,
            enable_session_24h: true,
            enable_session_1h: true,
        }
    }
}

fn default_rsvp_first_hours() -> i64 {
    24
}

fn default_rsvp_second_hours() -> i64 {
    48
}

fn default_tolerance_minutes() -> i64 {
    30
}

fn default_true() -> bool {
    true
}

// --- Notification Gateway Config ---
// Holds the non-secret part of the outbound message gateway. The API key is
// loaded via APP_NOTIFY__API_KEY or NOTIFY_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_email: String,
    pub from_sms: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_reminders: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>, // Central DB config
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub reminders: Option<RemindersConfig>,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}
