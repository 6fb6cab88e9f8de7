use crate::config::Config;
use crate::db::event_store::EventStore;
use crate::state::report_cache::ReportCache;

pub struct AppState {
    pub config: Config,
    pub store: EventStore,
    pub reports: ReportCache,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = EventStore::new(config.analytics_file.clone(), config.store_lock_timeout);
        let reports = ReportCache::new(config.report_cache_ttl);
        Self {
            config,
            store,
            reports,
        }
    }
}
