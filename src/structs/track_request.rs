use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::event::EventData;

#[derive(Deserialize, Serialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageviewRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "visitorId is required"))]
    pub visitor_id: String,
    pub session_id: Option<String>,
    pub page: Option<String>,
    pub referrer: Option<String>,
    pub device_type: Option<String>,
    pub user_agent: Option<String>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub language: Option<String>,
}

#[derive(Deserialize, Serialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "visitorId is required"))]
    pub visitor_id: String,
    pub session_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "eventName is required"))]
    pub event_name: String,
    pub event_data: Option<EventData>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TrackResponse {
    pub success: bool,
    pub message: String,
}

impl TrackResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}
