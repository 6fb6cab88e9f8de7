use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageviewRecord {
    pub visitor_id: String,
    #[serde(default)]
    pub session_id: String,
    pub timestamp: i64,
    pub page: String,
}

impl PageviewRecord {
    pub fn new(visitor_id: String, session_id: String, page: String, timestamp: i64) -> Self {
        Self {
            visitor_id,
            session_id,
            timestamp,
            page,
        }
    }

    pub fn session_key(&self) -> &str {
        if self.session_id.is_empty() {
            &self.visitor_id
        } else {
            &self.session_id
        }
    }
}
