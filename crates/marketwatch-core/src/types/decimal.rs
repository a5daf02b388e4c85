//! 수치 타입.

use rust_decimal::{Decimal, RoundingStrategy};

/// 가격 타입.
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;

/// 합산 수치를 소수 8자리로 고정합니다.
///
/// 반올림은 사사오입(midpoint away from zero)이고, 자릿수를 8자리로
/// 맞춰 직렬화 표현을 안정화합니다.
pub fn fixed8(value: Decimal) -> Decimal {
    let mut fixed = value.round_dp_with_strategy(8, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(8);
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pads_to_eight_decimal_places() {
        assert_eq!(fixed8(dec!(3)).to_string(), "3.00000000");
        assert_eq!(fixed8(dec!(0.1)).to_string(), "0.10000000");
    }

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(fixed8(dec!(0.000000015)).to_string(), "0.00000002");
        assert_eq!(fixed8(dec!(0.000000014)).to_string(), "0.00000001");
    }
}
