//! CLI library for testing purposes

pub mod settings;

pub use dupescan::ScanConfig;
pub use settings::Settings;
