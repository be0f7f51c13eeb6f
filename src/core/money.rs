//! Currency helpers.
//!
//! Every amount in the engine is a [`Decimal`]; rounding happens only at the
//! cent, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// One cent, the tolerance for every monetary invariant.
pub const CENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount to two decimal places, half away from zero.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Decimal places kept for quantities and unit prices.
pub const QUANTITY_SCALE: u32 = 4;

/// Rounds a quantity or unit price to [`QUANTITY_SCALE`] places, half away
/// from zero. Stored values never carry more places than this.
#[must_use]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes a line total as `round_cents(quantity * unit_price)`.
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_cents(quantity * unit_price)
}

/// True when the two amounts differ by at most one cent.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= CENT_TOLERANCE
}

/// Plain two-place rendering (`"1234.50"`), used for exports.
#[must_use]
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_cents(value))
}

/// Brazilian real display (`"R$ 1.234,50"`).
#[must_use]
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_cents(value);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_rounds_half_up() {
        // 3 * 10.005 = 30.015
        let total = line_total(Decimal::from(3), Decimal::new(10005, 3));
        assert_eq!(total, Decimal::new(3002, 2));
    }

    #[test]
    fn test_line_total_exact() {
        let total = line_total(Decimal::new(25, 1), Decimal::new(4000, 2));
        assert_eq!(total, Decimal::new(10000, 2));
    }

    #[test]
    fn test_round_quantity() {
        assert_eq!(round_quantity(Decimal::new(100_005, 5)), Decimal::new(10001, 4));
        assert_eq!(round_quantity(Decimal::new(25, 1)), Decimal::new(25, 1));
    }

    #[test]
    fn test_round_cents_negative_midpoint() {
        assert_eq!(round_cents(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
    }

    #[test]
    fn test_within_tolerance() {
        assert!(within_tolerance(Decimal::new(10000, 2), Decimal::new(10001, 2)));
        assert!(!within_tolerance(Decimal::new(10000, 2), Decimal::new(10002, 2)));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from(150)), "150.00");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(Decimal::new(123450, 2)), "R$ 1.234,50");
        assert_eq!(format_brl(Decimal::from(75)), "R$ 75,00");
        assert_eq!(format_brl(Decimal::new(100000000, 2)), "R$ 1.000.000,00");
        assert_eq!(format_brl(Decimal::new(-5050, 2)), "-R$ 50,50");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }
}
