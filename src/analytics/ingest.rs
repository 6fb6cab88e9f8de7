use std::collections::HashSet;

use chrono::{DateTime, TimeZone};

use crate::analytics::aggregate::{DAY_MS, start_of_day};
use crate::analytics::device;
use crate::models::event::EventRecord;
use crate::models::pageview::PageviewRecord;
use crate::models::store_document::{Rollup, StoreDocument};
use crate::models::visitor::VisitorRecord;
use crate::structs::track_request::{EventRequest, PageviewRequest};

/// Repeat views of the same page in the same session closer than this are dropped.
pub const DEDUP_WINDOW_MS: i64 = 2_000;
pub const RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageviewOutcome {
    Recorded,
    DuplicateSkipped,
}

fn effective_session<'a>(session_id: Option<&'a str>, visitor_id: &'a str) -> &'a str {
    session_id.filter(|s| !s.is_empty()).unwrap_or(visitor_id)
}

fn is_duplicate(doc: &StoreDocument, session: &str, page: &str, now_ms: i64) -> bool {
    doc.pageviews.iter().any(|pv| {
        pv.session_key() == session
            && pv.page == page
            && (0..=DEDUP_WINDOW_MS).contains(&(now_ms - pv.timestamp))
    })
}

/// Apply one pageview to the document. Callers persist only on `Recorded`.
pub fn record_pageview<Tz: TimeZone>(
    doc: &mut StoreDocument,
    req: &PageviewRequest,
    now: &DateTime<Tz>,
) -> PageviewOutcome {
    let now_ms = now.timestamp_millis();
    let session = effective_session(req.session_id.as_deref(), &req.visitor_id).to_string();
    let page = req
        .page
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or("/")
        .to_string();

    if is_duplicate(doc, &session, &page, now_ms) {
        log::debug!("Duplicate pageview skipped for session {} on {}", session, page);
        return PageviewOutcome::DuplicateSkipped;
    }

    if !doc.visitors.iter().any(|v| v.session_key() == session) {
        let user_agent = req.user_agent.clone().unwrap_or_default();
        let screen_width = req.screen_width.unwrap_or(0);
        doc.visitors.push(VisitorRecord {
            visitor_id: req.visitor_id.clone(),
            session_id: session.clone(),
            timestamp: now_ms,
            page: page.clone(),
            referrer: req.referrer.clone().unwrap_or_default(),
            device_type: device::resolve(req.device_type.as_deref(), &user_agent, screen_width),
            user_agent,
            screen_width,
            screen_height: req.screen_height.unwrap_or(0),
            language: req.language.clone().unwrap_or_default(),
        });
    }

    doc.pageviews.push(PageviewRecord::new(
        req.visitor_id.clone(),
        session,
        page,
        now_ms,
    ));

    refresh_rollup(doc, now);
    prune(doc, now_ms);

    PageviewOutcome::Recorded
}

/// Custom events are appended as-is, without dedup or pruning.
pub fn record_event(doc: &mut StoreDocument, req: &EventRequest, now_ms: i64) {
    doc.events.push(EventRecord {
        visitor_id: req.visitor_id.clone(),
        session_id: req.session_id.clone().unwrap_or_default(),
        event_name: req.event_name.clone(),
        event_data: req.event_data.clone().unwrap_or_default(),
        timestamp: now_ms,
    });
}

pub fn refresh_rollup<Tz: TimeZone>(doc: &mut StoreDocument, now: &DateTime<Tz>) {
    let today = start_of_day(now, 0).timestamp_millis();

    let distinct = |since: i64| {
        doc.visitors
            .iter()
            .filter(|v| v.timestamp >= since)
            .map(|v| v.visitor_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    };

    doc.stats = Rollup {
        total_visitors: distinct(i64::MIN),
        total_pageviews: doc.pageviews.len(),
        today_visitors: distinct(today),
        today_pageviews: doc.pageviews.iter().filter(|p| p.timestamp >= today).count(),
    };
}

/// Drop every record older than the retention window.
pub fn prune(doc: &mut StoreDocument, now_ms: i64) {
    let cutoff = now_ms - RETENTION_DAYS * DAY_MS;
    doc.visitors.retain(|v| v.timestamp >= cutoff);
    doc.pageviews.retain(|p| p.timestamp >= cutoff);
    doc.events.retain(|e| e.timestamp >= cutoff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{EventData, LanguageToggle};
    use crate::models::visitor::DeviceType;
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn view(visitor_id: &str, session_id: Option<&str>, page: &str) -> PageviewRequest {
        PageviewRequest {
            visitor_id: visitor_id.into(),
            session_id: session_id.map(String::from),
            page: Some(page.into()),
            ..Default::default()
        }
    }

    #[test]
    fn views_within_two_seconds_are_deduplicated() {
        let mut doc = StoreDocument::default();
        let req = view("v1", Some("s1"), "/faculty");

        assert_eq!(record_pageview(&mut doc, &req, &now()), PageviewOutcome::Recorded);
        let again = now() + Duration::milliseconds(2_000);
        assert_eq!(
            record_pageview(&mut doc, &req, &again),
            PageviewOutcome::DuplicateSkipped
        );
        assert_eq!(doc.pageviews.len(), 1);
    }

    #[test]
    fn views_just_over_two_seconds_apart_are_both_kept() {
        let mut doc = StoreDocument::default();
        let req = view("v1", Some("s1"), "/faculty");

        record_pageview(&mut doc, &req, &now());
        let later = now() + Duration::milliseconds(2_001);
        assert_eq!(record_pageview(&mut doc, &req, &later), PageviewOutcome::Recorded);
        assert_eq!(doc.pageviews.len(), 2);
    }

    #[test]
    fn different_page_is_not_a_duplicate() {
        let mut doc = StoreDocument::default();
        record_pageview(&mut doc, &view("v1", Some("s1"), "/a"), &now());
        let outcome = record_pageview(&mut doc, &view("v1", Some("s1"), "/b"), &now());

        assert_eq!(outcome, PageviewOutcome::Recorded);
        assert_eq!(doc.pageviews.len(), 2);
    }

    #[test]
    fn only_first_view_of_a_session_creates_a_visitor() {
        let mut doc = StoreDocument::default();
        record_pageview(&mut doc, &view("v1", Some("s1"), "/"), &now());
        record_pageview(
            &mut doc,
            &view("v1", Some("s1"), "/students"),
            &(now() + Duration::seconds(10)),
        );
        record_pageview(
            &mut doc,
            &view("v1", Some("s2"), "/"),
            &(now() + Duration::seconds(20)),
        );

        assert_eq!(doc.visitors.len(), 2);
        assert_eq!(doc.pageviews.len(), 3);
        assert_eq!(doc.stats.total_visitors, 1);
        assert_eq!(doc.stats.total_pageviews, 3);
    }

    #[test]
    fn session_and_page_fall_back_to_defaults() {
        let mut doc = StoreDocument::default();
        let req = PageviewRequest {
            visitor_id: "v9".into(),
            ..Default::default()
        };
        record_pageview(&mut doc, &req, &now());

        assert_eq!(doc.pageviews[0].session_id, "v9");
        assert_eq!(doc.pageviews[0].page, "/");
        assert_eq!(doc.visitors[0].session_id, "v9");
        assert_eq!(doc.visitors[0].device_type, DeviceType::Desktop);
    }

    #[test]
    fn client_device_type_is_kept_when_known() {
        let mut doc = StoreDocument::default();
        let req = PageviewRequest {
            visitor_id: "v1".into(),
            device_type: Some("mobile".into()),
            screen_width: Some(1920),
            ..Default::default()
        };
        record_pageview(&mut doc, &req, &now());

        assert_eq!(doc.visitors[0].device_type, DeviceType::Mobile);
    }

    #[test]
    fn pageview_prunes_records_past_retention() {
        let now_ms = now().timestamp_millis();
        let mut doc = StoreDocument::default();
        for (id, days) in [("old", 31), ("recent", 29)] {
            let ts = now_ms - days * DAY_MS;
            doc.visitors.push(VisitorRecord {
                visitor_id: id.into(),
                session_id: id.into(),
                timestamp: ts,
                page: "/".into(),
                referrer: String::new(),
                device_type: DeviceType::Desktop,
                user_agent: String::new(),
                screen_width: 0,
                screen_height: 0,
                language: "en".into(),
            });
            doc.pageviews
                .push(PageviewRecord::new(id.into(), id.into(), "/".into(), ts));
            doc.events.push(EventRecord {
                visitor_id: id.into(),
                session_id: id.into(),
                event_name: "click".into(),
                event_data: EventData::default(),
                timestamp: ts,
            });
        }

        record_pageview(&mut doc, &view("v1", None, "/"), &now());

        let ids: Vec<_> = doc.visitors.iter().map(|v| v.visitor_id.as_str()).collect();
        assert_eq!(ids, ["recent", "v1"]);
        let ids: Vec<_> = doc.pageviews.iter().map(|p| p.visitor_id.as_str()).collect();
        assert_eq!(ids, ["recent", "v1"]);
        assert_eq!(doc.events.len(), 1);
        assert_eq!(doc.events[0].visitor_id, "recent");
    }

    #[test]
    fn rollup_counts_today_separately() {
        let mut doc = StoreDocument::default();
        record_pageview(
            &mut doc,
            &view("v1", None, "/"),
            &(now() - Duration::days(2)),
        );
        record_pageview(&mut doc, &view("v2", None, "/"), &now());

        assert_eq!(doc.stats.total_visitors, 2);
        assert_eq!(doc.stats.today_visitors, 1);
        assert_eq!(doc.stats.today_pageviews, 1);
    }

    #[test]
    fn events_are_appended_with_defaults() {
        let mut doc = StoreDocument::default();
        let req = EventRequest {
            visitor_id: "v1".into(),
            event_name: "language_toggle".into(),
            event_data: Some(EventData::LanguageToggle(LanguageToggle {
                language: "en".into(),
            })),
            ..Default::default()
        };
        record_event(&mut doc, &req, 42);
        record_event(&mut doc, &req, 42);

        assert_eq!(doc.events.len(), 2);
        assert_eq!(doc.events[0].session_id, "");
        assert_eq!(doc.events[0].timestamp, 42);
    }
}
