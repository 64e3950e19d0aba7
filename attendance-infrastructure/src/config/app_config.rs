use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use attendance_domain::{
    CaptureConfig, Color, DatastoreConfig, RenderStyle, RuntimeConfig, CREDENTIAL_MARGIN,
    CREDENTIAL_SIZE,
};

pub const DEFAULT_EVENT_NAME: &str = "Inferno Verse 2025";
pub const DEFAULT_FILE_PREFIX: &str = "inferno-verse";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub datastore_url: Option<String>,
    pub datastore_key: Option<String>,
    pub event_name: String,
    pub credential_file_prefix: String,
    pub credential_dir: String,
    pub qr_foreground: String,
    pub qr_background: String,
    pub qr_size: u32,
    pub qr_margin: u32,
    pub scan_fps: u32,
    pub scan_box_size: u32,
    pub reset_delay_ms: u64,
    pub duplicate_check: bool,
    pub request_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub volunteer_name: Option<String>,
    pub volunteer_email: Option<String>,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            datastore_url: None,
            datastore_key: None,
            event_name: DEFAULT_EVENT_NAME.to_string(),
            credential_file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            credential_dir: "./credentials".to_string(),
            qr_foreground: "#00FFFF".to_string(),
            qr_background: "#0F172A".to_string(),
            qr_size: CREDENTIAL_SIZE,
            qr_margin: CREDENTIAL_MARGIN,
            scan_fps: 10,
            scan_box_size: 250,
            reset_delay_ms: 3000,
            duplicate_check: false,
            request_timeout_seconds: 15,
            max_body_bytes: 1024 * 1024,
            volunteer_name: None,
            volunteer_email: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("ATTENDANCE_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", path, err))?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        for value in [
            &mut self.api_token,
            &mut self.datastore_url,
            &mut self.datastore_key,
            &mut self.volunteer_name,
            &mut self.volunteer_email,
            &mut self.log_dir,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
        if let Some(url) = &mut self.datastore_url {
            *url = url.trim().trim_end_matches('/').to_string();
        }
        self.event_name = self.event_name.trim().to_string();
        self.credential_file_prefix = self.credential_file_prefix.trim().to_string();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.credential_dir = resolve_path(base, &self.credential_dir);
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        self.render_style()?;
        if self.event_name.is_empty() {
            return Err(anyhow!("event_name must not be empty"));
        }
        if self.credential_file_prefix.is_empty() {
            return Err(anyhow!("credential_file_prefix must not be empty"));
        }
        if self.qr_size == 0 {
            return Err(anyhow!("qr_size must be greater than 0"));
        }
        if self.scan_fps == 0 || self.scan_fps > 60 {
            return Err(anyhow!("scan_fps must be between 1 and 60"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if let Some(url) = &self.datastore_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("datastore_url must be an http(s) URL"));
            }
        }
        Ok(())
    }

    pub fn render_style(&self) -> Result<RenderStyle> {
        Ok(RenderStyle {
            foreground: Color::from_hex(&self.qr_foreground)?,
            background: Color::from_hex(&self.qr_background)?,
            size: self.qr_size,
            margin: self.qr_margin,
        })
    }

    pub fn to_runtime_config(&self) -> Result<RuntimeConfig> {
        Ok(RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            event_name: self.event_name.clone(),
            credential_file_prefix: self.credential_file_prefix.clone(),
            credential_dir: self.credential_dir.clone(),
            render_style: self.render_style()?,
            capture: CaptureConfig {
                fps: self.scan_fps,
                box_size: self.scan_box_size,
                ..CaptureConfig::default()
            },
            reset_delay_ms: self.reset_delay_ms,
            duplicate_check: self.duplicate_check,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        })
    }

    pub fn to_datastore_config(&self) -> DatastoreConfig {
        DatastoreConfig {
            datastore_url: self.datastore_url.clone(),
            datastore_key: self.datastore_key.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ATTENDANCE_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("ATTENDANCE_DATASTORE_URL") {
            self.datastore_url = Some(value);
        }
        if let Ok(value) = env::var("ATTENDANCE_DATASTORE_KEY") {
            self.datastore_key = Some(value);
        }
        if let Ok(value) = env::var("ATTENDANCE_EVENT_NAME") {
            self.event_name = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_CREDENTIAL_FILE_PREFIX") {
            self.credential_file_prefix = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_CREDENTIAL_DIR") {
            self.credential_dir = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_QR_FOREGROUND") {
            self.qr_foreground = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_QR_BACKGROUND") {
            self.qr_background = value;
        }
        if let Ok(value) = env::var("ATTENDANCE_QR_SIZE") {
            self.qr_size = value.parse().unwrap_or(self.qr_size);
        }
        if let Ok(value) = env::var("ATTENDANCE_QR_MARGIN") {
            self.qr_margin = value.parse().unwrap_or(self.qr_margin);
        }
        if let Ok(value) = env::var("ATTENDANCE_SCAN_FPS") {
            self.scan_fps = value.parse().unwrap_or(self.scan_fps);
        }
        if let Ok(value) = env::var("ATTENDANCE_SCAN_BOX_SIZE") {
            self.scan_box_size = value.parse().unwrap_or(self.scan_box_size);
        }
        if let Ok(value) = env::var("ATTENDANCE_RESET_DELAY_MS") {
            self.reset_delay_ms = value.parse().unwrap_or(self.reset_delay_ms);
        }
        if let Ok(value) = env::var("ATTENDANCE_DUPLICATE_CHECK") {
            self.duplicate_check = value.parse().unwrap_or(self.duplicate_check);
        }
        if let Ok(value) = env::var("ATTENDANCE_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("ATTENDANCE_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ATTENDANCE_VOLUNTEER_NAME") {
            self.volunteer_name = Some(value);
        }
        if let Ok(value) = env::var("ATTENDANCE_VOLUNTEER_EMAIL") {
            self.volunteer_email = Some(value);
        }
        if let Ok(value) = env::var("ATTENDANCE_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
