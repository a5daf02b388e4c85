//! 거래소별 소스 구현.

pub mod binance;
