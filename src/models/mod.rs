pub mod event;
pub mod pageview;
pub mod store_document;
pub mod visitor;
