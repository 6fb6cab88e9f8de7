use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    /// Parse a client supplied label, ignoring case. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "desktop" => Some(DeviceType::Desktop),
            "mobile" => Some(DeviceType::Mobile),
            "tablet" => Some(DeviceType::Tablet),
            _ => None,
        }
    }
}

// Stored labels outside the known set count as desktop instead of failing the document
impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .and_then(DeviceType::from_label)
            .unwrap_or_default())
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Desktop => write!(f, "desktop"),
            DeviceType::Mobile => write!(f, "mobile"),
            DeviceType::Tablet => write!(f, "tablet"),
        }
    }
}

/// First pageview of a browser session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub visitor_id: String,
    pub session_id: String,
    pub timestamp: i64, // Epoch millis, server time
    pub page: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub language: String,
}

impl VisitorRecord {
    /// Session key used for grouping; falls back to the visitor id.
    pub fn session_key(&self) -> &str {
        if self.session_id.is_empty() {
            &self.visitor_id
        } else {
            &self.session_id
        }
    }
}
