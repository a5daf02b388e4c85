//! 수집 모듈.

pub mod build;

pub use build::{build_candles, persist_durations, run_sources, BuildOutcome};
