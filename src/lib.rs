pub mod aggregator;
pub mod color;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod sentiment;
pub mod templates;
pub mod twitter_client;
pub mod views;
