pub mod availability;
pub mod bucket;
pub mod bulk;
pub mod client;
pub mod config;
pub mod platform;
pub mod protocol;
