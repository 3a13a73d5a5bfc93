pub mod client;
pub mod matcher;
pub mod models;
pub mod platform;
