//! 마켓 워처 수집기.
//!
//! 거래소 체결 데이터를 수집해 기간별 캔들로 저장하는 바이너리의
//! 라이브러리 부분입니다:
//! - 소스 하나를 빌드하는 오케스트레이션 (수집 → 집계 → 전체 교체 저장)
//! - 설정 파일 + CLI 오버라이드 병합
//! - 실행 통계

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::{build_source, RunOptions};
pub use error::{CollectorError, Result};
pub use stats::BuildStats;
