//! Display formatting for amounts and USD estimates

/// Format a number with thousands separators and at most `max_fraction_digits`
/// fraction digits (trailing zeros trimmed).
pub fn format_amount(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (grouped != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Format an optional USD estimate; missing values render as `-`
pub fn format_usd(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${}", format_amount(v, 2)),
        _ => "-".to_string(),
    }
}
