//! 코어 타입 정의.

pub mod candle;
pub mod decimal;
pub mod duration;
pub mod trade;

pub use candle::{aggregate, Candle};
pub use decimal::{fixed8, Price, Quantity};
pub use duration::CandleDuration;
pub use trade::Trade;
