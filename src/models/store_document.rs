use serde::{Deserialize, Serialize};

use crate::models::event::EventRecord;
use crate::models::pageview::PageviewRecord;
use crate::models::visitor::VisitorRecord;

/// Precomputed counters stored next to the raw records.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Rollup {
    pub total_visitors: usize,
    pub total_pageviews: usize,
    pub today_visitors: usize,
    pub today_pageviews: usize,
}

/// The whole persisted analytics document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StoreDocument {
    #[serde(default)]
    pub visitors: Vec<VisitorRecord>,
    #[serde(default)]
    pub pageviews: Vec<PageviewRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub stats: Rollup,
}
