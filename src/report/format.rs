//! Brazilian-style money formatting (`R$ 1.234,56`).

use rust_decimal::{Decimal, RoundingStrategy};

/// Group the integer part with `.` and use `,` for the two cents digits.
pub fn pt_br(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (integer, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, grouped, cents)
}

pub fn brl(amount: Decimal) -> String {
    format!("R$ {}", pt_br(amount))
}

pub fn usd(amount: Decimal) -> String {
    format!("US$ {}", pt_br(amount))
}
