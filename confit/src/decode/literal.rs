//! Duration and size literal conversion

use thiserror::Error;

/// A duration or size literal that cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {text:?}")]
    UnknownDurationUnit { unit: String, text: String },

    #[error("invalid size {0:?}")]
    InvalidSize(String),

    #[error("unrecognized size {0}")]
    UnknownSizeUnit(String),

    #[error("{0:?} overflows")]
    Overflow(String),
}

const NANOSECOND: i128 = 1;
const MICROSECOND: i128 = 1_000 * NANOSECOND;
const MILLISECOND: i128 = 1_000 * MICROSECOND;
const SECOND: i128 = 1_000 * MILLISECOND;
const MINUTE: i128 = 60 * SECOND;
const HOUR: i128 = 60 * MINUTE;
const DAY: i128 = 24 * HOUR;

/// Fraction digits beyond this cannot change a nanosecond count.
const MAX_FRACTION_DIGITS: usize = 18;

fn duration_unit(unit: &str) -> Option<i128> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        "d" => Some(DAY),
        _ => None,
    }
}

fn size_unit(unit: &str) -> Option<u32> {
    let exp = match unit {
        "B" => 0,
        "KB" => 1,
        "MB" => 2,
        "GB" => 3,
        "TB" => 4,
        "PB" => 5,
        "EB" => 6,
        "ZB" => 7,
        _ => return None,
    };
    Some(exp * 10)
}

/// Convert a duration literal such as `1h30m`, `250ms` or `1.5h` to
/// nanoseconds.
///
/// A leading `-` negates the whole literal.
pub fn parse_duration(text: &str) -> Result<i128, LiteralError> {
    let (negative, mut rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if rest.is_empty() {
        return Err(LiteralError::InvalidDuration(text.to_string()));
    }

    let overflow = || LiteralError::Overflow(text.to_string());
    let mut total: i128 = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        if number.is_empty() {
            return Err(LiteralError::InvalidDuration(text.to_string()));
        }
        if unit.is_empty() {
            return Err(LiteralError::MissingUnit(text.to_string()));
        }

        let scale = duration_unit(unit).ok_or_else(|| LiteralError::UnknownDurationUnit {
            unit: unit.to_string(),
            text: text.to_string(),
        })?;

        let (whole, fraction) = match number.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (number, ""),
        };
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(LiteralError::InvalidDuration(text.to_string()));
        }

        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut value = whole.checked_mul(scale).ok_or_else(overflow)?;

        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let digits: i128 = fraction.parse().map_err(|_| overflow())?;
            let denominator = 10i128.pow(fraction.len() as u32);
            value = value
                .checked_add(digits * scale / denominator)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(value).ok_or_else(overflow)?;
        rest = tail;
    }

    Ok(if negative { -total } else { total })
}

/// Convert a size literal such as `50MB` to bytes (powers of 1024).
pub fn parse_size(text: &str) -> Result<i128, LiteralError> {
    let unit_start = text
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| LiteralError::InvalidSize(text.to_string()))?;
    let (number, unit) = text.split_at(unit_start);

    let shift = size_unit(unit).ok_or_else(|| LiteralError::UnknownSizeUnit(unit.to_string()))?;

    let (negative, digits) = match number.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, number),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LiteralError::InvalidSize(text.to_string()));
    }

    let overflow = || LiteralError::Overflow(text.to_string());
    let value: i128 = digits.parse().map_err(|_| overflow())?;
    let bytes = value.checked_mul(1i128 << shift).ok_or_else(overflow)?;

    Ok(if negative { -bytes } else { bytes })
}
