pub mod admin_handlers;
pub mod auth_handlers;
pub mod health_handlers;
pub mod stats_handlers;
pub mod track_handlers;
