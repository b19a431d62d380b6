pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod feed;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod streak;
pub mod views;
