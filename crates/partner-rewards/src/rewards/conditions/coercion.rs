//! Loose text/number coercion used by string and numeric operators.
//!
//! Configured thresholds are frequently stored as text (`"100"`), and context attributes may
//! arrive as text or explicit nulls. These helpers give every value a text and a numeric
//! reading so operators can compare across representations. Values with no numeric reading
//! become NaN, which compares false everywhere.

use std::borrow::Cow;

use super::super::domain::{AttributeValue, ConditionValue};

pub(crate) fn attribute_as_number(value: &AttributeValue) -> f64 {
    match value {
        AttributeValue::Null => 0.0,
        AttributeValue::Number(number) => *number,
        AttributeValue::Text(text) => text_as_number(text),
    }
}

pub(crate) fn condition_as_number(value: &ConditionValue) -> f64 {
    match value {
        ConditionValue::Number(number) => *number,
        ConditionValue::Text(text) => text_as_number(text),
        ConditionValue::NumberList(items) => match items.as_slice() {
            [] => 0.0,
            [only] => *only,
            _ => f64::NAN,
        },
        ConditionValue::TextList(items) => match items.as_slice() {
            [] => 0.0,
            [only] => text_as_number(only),
            _ => f64::NAN,
        },
    }
}

pub(crate) fn attribute_as_text(value: &AttributeValue) -> Cow<'_, str> {
    match value {
        AttributeValue::Null => Cow::Borrowed("null"),
        AttributeValue::Number(number) => Cow::Owned(number_as_text(*number)),
        AttributeValue::Text(text) => Cow::Borrowed(text.as_str()),
    }
}

pub(crate) fn condition_as_text(value: &ConditionValue) -> Cow<'_, str> {
    match value {
        ConditionValue::Number(number) => Cow::Owned(number_as_text(*number)),
        ConditionValue::Text(text) => Cow::Borrowed(text.as_str()),
        ConditionValue::NumberList(items) => Cow::Owned(
            items
                .iter()
                .map(|item| number_as_text(*item))
                .collect::<Vec<_>>()
                .join(","),
        ),
        ConditionValue::TextList(items) => Cow::Owned(items.join(",")),
    }
}

/// Parse text the way loose numeric conversion does: surrounding whitespace is ignored, empty
/// text is zero, and anything that is not a complete number is NaN.
pub(crate) fn text_as_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(value) = radix_literal(trimmed) {
        return value;
    }

    // f64::from_str also accepts "inf" and "NaN", which are not numbers here.
    let decimal_shape = trimmed
        .bytes()
        .all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal_shape {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn radix_literal(text: &str) -> Option<f64> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };

    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let parsed = digits.chars().try_fold(0.0_f64, |acc, digit| {
        digit
            .to_digit(radix)
            .map(|value| acc * f64::from(radix) + f64::from(value))
    });
    Some(parsed.unwrap_or(f64::NAN))
}

/// Render a number with the shortest digits that round-trip. Decimal exponents from -6 to 20
/// print positionally, anything outside that range switches to `1e+21` / `1e-7` notation.
pub(crate) fn number_as_text(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number.is_infinite() {
        let text = if number > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if number == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:e}", number.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();
    let width = digits.len() as i32;
    let point = exponent + 1;

    let body = if width <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - width) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let (lead, rest) = digits.split_at(1);
        let sign = if exponent >= 0 { '+' } else { '-' };
        if rest.is_empty() {
            format!("{lead}e{sign}{}", exponent.abs())
        } else {
            format!("{lead}.{rest}e{sign}{}", exponent.abs())
        }
    };

    if number < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}
