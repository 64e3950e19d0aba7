// Connectivity status entity

use serde::{Deserialize, Serialize};

/// Last known outcome of the datastore preflight probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    #[default]
    Checking,
    Connected,
    Error,
}

impl ConnectivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityStatus::Checking => "checking",
            ConnectivityStatus::Connected => "connected",
            ConnectivityStatus::Error => "error",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityStatus::Connected)
    }
}
