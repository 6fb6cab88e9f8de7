use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LanguageToggle {
    pub language: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Click {
    pub element: String,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CarouselInteraction {
    pub slide: u32,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

// An explicit null would be dropped on output, so such payloads stay `Custom`
fn non_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    String::deserialize(deserializer).map(Some)
}

/// Payload attached to a custom event.
///
/// Known dashboard telemetry shapes are recognised; anything else is kept as an
/// opaque JSON object. On the wire every variant is a plain object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum EventData {
    LanguageToggle(LanguageToggle),
    Click(Click),
    Carousel(CarouselInteraction),
    Custom(Map<String, Value>),
}

impl Default for EventData {
    fn default() -> Self {
        EventData::Custom(Map::new())
    }
}

impl EventData {
    pub fn kind(&self) -> &'static str {
        match self {
            EventData::LanguageToggle(_) => "language_toggle",
            EventData::Click(_) => "click",
            EventData::Carousel(_) => "carousel",
            EventData::Custom(_) => "custom",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub visitor_id: String,
    #[serde(default)]
    pub session_id: String,
    pub event_name: String,
    #[serde(default)]
    pub event_data: EventData,
    pub timestamp: i64,
}
