// Runtime configuration handed to the application layer

use crate::value_objects::RenderStyle;
use crate::CaptureConfig;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub event_name: String,
    pub credential_file_prefix: String,
    pub credential_dir: String,
    pub render_style: RenderStyle,
    pub capture: CaptureConfig,
    pub reset_delay_ms: u64,
    pub duplicate_check: bool,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DatastoreConfig {
    pub datastore_url: Option<String>,
    pub datastore_key: Option<String>,
    pub request_timeout_seconds: u64,
}
