use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Days, NaiveTime, TimeZone};
use serde::Serialize;

use crate::models::store_document::StoreDocument;
use crate::models::visitor::DeviceType;

pub const DAY_MS: i64 = 86_400_000;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: String,
    pub visitors: usize,
    pub page_views: usize,
}

/// Integer share of visitors per device type.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct DeviceStats {
    pub desktop: u32,
    pub mobile: u32,
    pub tablet: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub visitors: usize,
    pub pageviews: usize,
    pub bounce_rate: f64,
}

/// Local midnight `days_back` days before `now`'s calendar day.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>, days_back: u64) -> DateTime<Tz> {
    let date = now.date_naive() - Days::new(days_back);
    let midnight = date.and_time(NaiveTime::MIN);
    let tz = now.timezone();
    // A DST gap can swallow midnight; fall back to reading it as UTC
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Read-only metrics over a document snapshot, relative to a fixed `now`.
///
/// Windowed metrics consider records with `timestamp > now - days * DAY_MS`.
pub struct Aggregator<'a, Tz: TimeZone> {
    doc: &'a StoreDocument,
    now: DateTime<Tz>,
}

impl<'a, Tz: TimeZone> Aggregator<'a, Tz> {
    pub fn new(doc: &'a StoreDocument, now: DateTime<Tz>) -> Self {
        Self { doc, now }
    }

    fn cutoff(&self, days: u32) -> i64 {
        self.now.timestamp_millis() - i64::from(days) * DAY_MS
    }

    pub fn unique_visitors(&self, days: u32) -> usize {
        let cutoff = self.cutoff(days);
        self.doc
            .visitors
            .iter()
            .filter(|v| v.timestamp > cutoff)
            .map(|v| v.visitor_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn pageview_count(&self, days: u32) -> usize {
        let cutoff = self.cutoff(days);
        self.doc
            .pageviews
            .iter()
            .filter(|p| p.timestamp > cutoff)
            .count()
    }

    /// Percentage of sessions that saw exactly one distinct page, to one decimal.
    pub fn bounce_rate(&self, days: u32) -> f64 {
        let cutoff = self.cutoff(days);
        let mut sessions: HashMap<&str, HashSet<&str>> = HashMap::new();
        for pv in self.doc.pageviews.iter().filter(|p| p.timestamp > cutoff) {
            sessions
                .entry(pv.session_key())
                .or_default()
                .insert(pv.page.as_str());
        }

        if sessions.is_empty() {
            return 0.0;
        }

        let bounces = sessions.values().filter(|pages| pages.len() == 1).count();
        let rate = bounces as f64 / sessions.len() as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }

    /// One entry per calendar day, oldest first, ending with today.
    pub fn daily_series(&self, days: u32) -> Vec<DailyStat> {
        (0..u64::from(days))
            .rev()
            .map(|back| {
                let start = start_of_day(&self.now, back);
                let from = start.timestamp_millis();
                let to = from + DAY_MS;
                let in_day = |ts: i64| ts >= from && ts < to;

                let visitors = self
                    .doc
                    .visitors
                    .iter()
                    .filter(|v| in_day(v.timestamp))
                    .map(|v| v.visitor_id.as_str())
                    .collect::<HashSet<_>>()
                    .len();
                let page_views = self
                    .doc
                    .pageviews
                    .iter()
                    .filter(|p| in_day(p.timestamp))
                    .count();

                DailyStat {
                    date: start.date_naive().format("%Y-%m-%d").to_string(),
                    visitors,
                    page_views,
                }
            })
            .collect()
    }

    /// Each share is rounded on its own, so the total may be off 100 by a point.
    pub fn device_distribution(&self, days: u32) -> DeviceStats {
        let cutoff = self.cutoff(days);
        let mut counts: HashMap<DeviceType, usize> = HashMap::new();
        let mut total = 0usize;
        for v in self.doc.visitors.iter().filter(|v| v.timestamp > cutoff) {
            *counts.entry(v.device_type).or_default() += 1;
            total += 1;
        }

        let share = |kind: DeviceType| -> u32 {
            if total == 0 {
                return 0;
            }
            let count = counts.get(&kind).copied().unwrap_or(0);
            (count as f64 * 100.0 / total as f64).round() as u32
        };

        DeviceStats {
            desktop: share(DeviceType::Desktop),
            mobile: share(DeviceType::Mobile),
            tablet: share(DeviceType::Tablet),
        }
    }

    pub fn window_summary(&self, days: u32) -> WindowSummary {
        WindowSummary {
            visitors: self.unique_visitors(days),
            pageviews: self.pageview_count(days),
            bounce_rate: self.bounce_rate(days),
        }
    }
}
