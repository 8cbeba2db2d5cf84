pub mod config;
pub mod estimator;
pub mod fetch;
pub mod output;
pub mod sources;
pub mod station;
pub mod stats;
