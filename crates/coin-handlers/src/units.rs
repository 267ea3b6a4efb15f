//! Conversions between system values (satoshi, wei, token base units) and
//! decimal display strings.

use std::cmp::Ordering;

use alloy_primitives::{I256, U256};

use crate::error::HandlerError;

/// Largest decimals count whose unit, `10^decimals`, fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

fn pow10(exp: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// `value / 10^exp`, rounded half up.
fn shift_right_rounded(value: U256, exp: u8) -> U256 {
    let Some(step) = pow10(exp) else {
        // 10^exp exceeds twice any U256, so the value rounds to zero.
        return U256::ZERO;
    };
    let quotient = value / step;
    let remainder = value % step;
    if remainder >= step - remainder {
        quotient + U256::from(1u8)
    } else {
        quotient
    }
}

/// Inserts a decimal point `precision` digits from the right.
fn place_point(digits: &str, precision: u8) -> String {
    if precision == 0 {
        return digits.to_string();
    }
    let width = precision as usize;
    let padded = format!("{digits:0>min$}", min = width + 1);
    let (whole, fraction) = padded.split_at(padded.len() - width);
    format!("{whole}.{fraction}")
}

/// Renders `value` with exactly `precision` fractional digits, rounding half up.
///
/// Works on the decimal digits directly, so no value can overflow.
pub fn format_display(value: U256, decimals: u8, precision: u8) -> String {
    let digits = match precision.cmp(&decimals) {
        Ordering::Less => shift_right_rounded(value, decimals - precision).to_string(),
        Ordering::Equal => value.to_string(),
        Ordering::Greater => {
            let mut digits = value.to_string();
            digits.extend(std::iter::repeat('0').take((precision - decimals) as usize));
            digits
        }
    };
    place_point(&digits, precision)
}

/// Like [`format_display`] with trailing fractional zeros removed.
pub fn format_trimmed(value: U256, decimals: u8, precision: u8) -> String {
    let rendered = format_display(value, decimals, precision);
    if !rendered.contains('.') {
        return rendered;
    }
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Parses a non-negative decimal string into base units.
pub fn parse_display(text: &str, decimals: u8) -> Result<U256, HandlerError> {
    let text = text.trim();
    if text.starts_with('-') {
        return Err(HandlerError::InvalidAmount(format!(
            "negative amount: {text}"
        )));
    }

    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(HandlerError::InvalidAmount(format!("not a number: {text:?}")));
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(HandlerError::InvalidAmount(format!("not a number: {text:?}")));
    }
    if fraction.len() > decimals as usize {
        return Err(HandlerError::InvalidAmount(format!(
            "{text} has more than {decimals} fractional digits"
        )));
    }

    if decimals > MAX_DECIMALS {
        return Err(HandlerError::InvalidAmount(format!(
            "{decimals} decimals exceeds the maximum of {MAX_DECIMALS}"
        )));
    }

    let digits = format!("{whole}{fraction:0<width$}", width = decimals as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10)
        .map_err(|_| HandlerError::InvalidAmount(format!("amount out of range: {text}")))
}

/// Lossy conversion for UI arithmetic.
pub fn to_f64(value: U256, decimals: u8) -> f64 {
    format_display(value, decimals, decimals)
        .parse()
        .unwrap_or(f64::NAN)
}

/// Lossy conversion from a float amount, rounded to `decimals` digits.
pub fn from_f64(amount: f64, decimals: u8) -> Result<U256, HandlerError> {
    if !amount.is_finite() {
        return Err(HandlerError::InvalidAmount(format!("not finite: {amount}")));
    }
    parse_display(&format!("{:.prec$}", amount, prec = decimals as usize), decimals)
}

/// Signed difference `a - b`.
pub fn diff(a: U256, b: U256) -> I256 {
    I256::from_raw(a.wrapping_sub(b))
}

pub fn compare(a: U256, b: U256) -> Ordering {
    a.cmp(&b)
}
