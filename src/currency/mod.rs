//! Integer-cent currency helpers.
//!
//! Amounts travel through the engine as signed cents; this module renders
//! them for display and reads loosely-typed dollar strings back in.

const SYMBOL: &str = "$";
const GROUPING_SEPARATOR: char = ',';
const DECIMAL_SEPARATOR: char = '.';

/// Formats cents as `$1,234.56`, with a leading `-` for negative amounts.
pub fn format_cents(cents: i64) -> String {
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let fraction = abs % 100;
    let body = format!(
        "{}{}{}{:02}",
        SYMBOL,
        group_digits(&whole, GROUPING_SEPARATOR),
        DECIMAL_SEPARATOR,
        fraction
    );
    if cents < 0 {
        format!("-{}", body)
    } else {
        body
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Parses a dollar string such as `$1,234.56`, `+50.00` or `-12` into cents.
///
/// Amounts are treated as expenses (negative) unless the input leads with `+`.
/// With `assume_positive`, the default flips to positive and only a leading
/// `-` or `$-` makes the value negative. Unparseable digits count as zero.
pub fn parse_dollars(input: &str, assume_positive: bool) -> i64 {
    let trimmed = input.trim();
    let negative = if trimmed.starts_with('+') {
        false
    } else if assume_positive {
        trimmed.starts_with('-') || trimmed.starts_with("$-")
    } else {
        true
    };

    let cleaned: String = trimmed
        .chars()
        .filter(|ch| !matches!(ch, '$' | '+' | '-' | ',') && !ch.is_whitespace())
        .collect();
    let (whole_part, fraction_part) = match cleaned.split_once(DECIMAL_SEPARATOR) {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    let whole = parse_digits(whole_part);
    let cents = fraction_cents(fraction_part);
    let magnitude = whole.saturating_mul(100).saturating_add(cents);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn fraction_cents(fraction: &str) -> i64 {
    if fraction.is_empty() {
        return 0;
    }
    let mut cents = parse_digits(fraction);
    if fraction.len() == 1 && !fraction.starts_with('0') {
        cents *= 10;
    }
    // A fraction like ".123" cannot name a cent amount.
    if cents >= 100 {
        0
    } else {
        cents
    }
}

fn parse_digits(raw: &str) -> i64 {
    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return 0;
    }
    raw.parse::<i64>().unwrap_or(0)
}
