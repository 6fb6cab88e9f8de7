pub mod auth;
pub mod stats_response;
pub mod track_request;
