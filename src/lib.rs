pub mod config;
pub mod date_range;
pub mod driver;
pub mod market_data;
pub mod models;
pub mod observer;
pub mod report;
pub mod trade_source;
