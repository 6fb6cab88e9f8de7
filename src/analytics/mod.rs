pub mod aggregate;
pub mod device;
pub mod ingest;
