pub mod engine;
mod service;

pub use service::{AnalysisParams, Analyzer};
