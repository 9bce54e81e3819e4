//! Display formatting for loose upstream values.
//!
//! One place defines every fallback, so all consumers render identical
//! strings for the same snapshot.

use report_core::LooseNum;

const NOT_AVAILABLE: &str = "N/A";

/// Format a percentage to one decimal place.
///
/// A value under magnitude 2 whose original text carried no literal `%` is
/// read as a fraction and scaled by 100 ("0.137" -> "13.7%", "45%" stays
/// "45.0%"). Unparseable text is echoed back unchanged; absent values render
/// as "N/A". `signed` prefixes a `+` on positive values (growth figures).
pub fn format_percent(value: Option<&LooseNum>, signed: bool) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let Some(mut num) = value.as_f64() else {
        return value
            .as_text()
            .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string);
    };
    if num.abs() < 2.0 && !value.has_percent_sign() {
        num *= 100.0;
    }
    let sign = if signed && num > 0.0 { "+" } else { "" };
    format!("{sign}{num:.1}%")
}

/// Abbreviate a large number with a T/B/M suffix at two-decimal precision,
/// largest threshold first. Below a million, group thousands with commas.
pub fn format_large_number(value: Option<&LooseNum>) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let Some(num) = value.as_f64() else {
        return value
            .as_text()
            .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string);
    };
    if num >= 1e12 {
        format!("{:.2}T", num / 1e12)
    } else if num >= 1e9 {
        format!("{:.2}B", num / 1e9)
    } else if num >= 1e6 {
        format!("{:.2}M", num / 1e6)
    } else {
        group_thousands(num)
    }
}

/// Plain numeric display for ratios (P/E, EPS): up to two decimals with
/// trailing zeros trimmed. Text echoes through, absent renders "N/A".
pub fn format_plain_number(value: Option<&LooseNum>) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    if let Some(text) = value.as_text() {
        return text.to_string();
    }
    match value.as_f64() {
        Some(num) => {
            let s = format!("{num:.2}");
            let s = s.trim_end_matches('0').trim_end_matches('.');
            s.to_string()
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Comma-grouped rendering with up to three decimals, locale-string style.
fn group_thousands(num: f64) -> String {
    let negative = num < 0.0;
    let formatted = format!("{:.3}", num.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let frac = frac_part.trim_end_matches('0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}
