use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;

    let mut out = String::new();
    if hundreds > 0 {
        out.push_str(ONES[hundreds as usize]);
        out.push_str(" hundred");
        if rest == 0 {
            return out;
        }
        out.push(' ');
    }

    if rest < 20 {
        out.push_str(ONES[rest as usize]);
    } else {
        out.push_str(TENS[(rest / 10) as usize]);
        if rest % 10 > 0 {
            out.push('-');
            out.push_str(ONES[(rest % 10) as usize]);
        }
    }
    out
}

/// English cardinal for `n`, e.g. `1234` → "one thousand, two hundred thirty-four".
pub fn to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = n;
    while rest > 0 {
        groups.push(rest % 1000);
        rest /= 1000;
    }

    groups
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, group)| **group > 0)
        .map(|(scale, group)| {
            let words = below_thousand(*group);
            if scale == 0 {
                words
            } else {
                format!("{} {}", words, SCALES[scale])
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upper-case the first letter of every word, including after hyphens.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

/// Whole-unit part of `amount` in title-cased words followed by `suffix`,
/// e.g. "One Hundred Thirty Rupees Only".
pub fn amount_in_words(amount: Decimal, suffix: &str) -> String {
    let whole = amount.trunc();
    let magnitude = whole.abs().to_u64().unwrap_or(u64::MAX);
    let mut words = to_words(magnitude);
    if whole < Decimal::ZERO {
        words = format!("minus {words}");
    }
    let words = title_case(&words);
    if suffix.is_empty() {
        words
    } else {
        format!("{words} {suffix}")
    }
}
