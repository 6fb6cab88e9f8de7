pub mod app_state;
pub mod report_cache;
