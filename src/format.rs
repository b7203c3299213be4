//! Indian-convention number formatting used on screen and in contracts.
//!
//! Amounts are grouped `12,34,567` (last three digits, then pairs) and spelled
//! out on the Lakh / Crore / Arab scale.

use chrono::{NaiveDate, NaiveTime};

use crate::error::FormatError;

const UNITS: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;
const ARAB: u64 = 1_000_000_000;

/// Anything an amount can arrive as: a stored integer or text typed by a user.
#[derive(Debug, Clone, Copy)]
pub enum AmountInput<'a> {
    Number(i64),
    Text(&'a str),
}

impl From<i64> for AmountInput<'_> {
    fn from(value: i64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<i32> for AmountInput<'_> {
    fn from(value: i32) -> Self {
        AmountInput::Number(i64::from(value))
    }
}

impl From<u32> for AmountInput<'_> {
    fn from(value: u32) -> Self {
        AmountInput::Number(i64::from(value))
    }
}

impl<'a> From<&'a str> for AmountInput<'a> {
    fn from(value: &'a str) -> Self {
        AmountInput::Text(value)
    }
}

impl<'a> From<&'a String> for AmountInput<'a> {
    fn from(value: &'a String) -> Self {
        AmountInput::Text(value.as_str())
    }
}

/// Groups the digits of `input` the Indian way.
///
/// Integers `<= 0` and text without any digits yield an empty string. Text is
/// stripped of every non-digit first, so already-formatted values regroup
/// cleanly.
pub fn format_grouped_digits<'a>(input: impl Into<AmountInput<'a>>) -> String {
    let digits = match input.into() {
        AmountInput::Number(n) if n <= 0 => return String::new(),
        AmountInput::Number(n) => n.to_string(),
        AmountInput::Text(text) => sanitize_digits(text),
    };
    group_digits(&digits)
}

fn sanitize_digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn group_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (mut rest, last_three) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while rest.len() > 2 {
        let (head, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = head;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    groups.push(last_three);
    groups.join(",")
}

/// Spells `n` out as `"Rupees ... Only"`. Negative amounts yield `""`.
pub fn number_to_words(n: i64) -> String {
    match u64::try_from(n) {
        Ok(value) => format!("Rupees {} Only", spell(value)),
        Err(_) => {
            tracing::debug!(amount = n, "refusing to spell a negative amount");
            String::new()
        }
    }
}

fn spell(n: u64) -> String {
    match n {
        0..=19 => UNITS[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                unit => format!("{tens} {}", UNITS[unit as usize]),
            }
        }
        100..=999 => {
            let hundreds = format!("{} Hundred", UNITS[(n / 100) as usize]);
            match n % 100 {
                0 => hundreds,
                rest => format!("{hundreds} And {}", spell(rest)),
            }
        }
        1_000..=99_999 => spell_scaled(n, THOUSAND, "Thousand"),
        100_000..=9_999_999 => spell_scaled(n, LAKH, "Lakh"),
        10_000_000..=999_999_999 => spell_scaled(n, CRORE, "Crore"),
        _ => spell_scaled(n, ARAB, "Arab"),
    }
}

fn spell_scaled(n: u64, scale: u64, name: &str) -> String {
    let head = format!("{} {name}", spell(n / scale));
    match n % scale {
        0 => head,
        rest => format!("{head} {}", spell(rest)),
    }
}

/// Parses a user-typed amount such as `"1,50,000"`.
pub fn parse_amount(text: &str) -> Result<i64, FormatError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(FormatError::InvalidInput("empty amount".into()));
    }
    let value: i64 = cleaned
        .parse()
        .map_err(|_| FormatError::InvalidInput(format!("not an amount: {text:?}")))?;
    if value < 0 {
        return Err(FormatError::InvalidInput(format!("negative amount: {text:?}")));
    }
    Ok(value)
}

/// Lightens a `#rrggbb` colour by raising its HSL lightness by `amount`.
pub fn lighten_color(hex: &str, amount: f64) -> Result<String, FormatError> {
    if !(0.0..=1.0).contains(&amount) {
        return Err(FormatError::InvalidInput(format!(
            "lightening amount {amount} outside 0..=1"
        )));
    }

    let [r, g, b] = parse_hex_rgb(hex)?;
    let (h, l, s) = rgb_to_hls(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );
    let (r, g, b) = hls_to_rgb(h, (l + amount).min(1.0), s);

    Ok(format!(
        "#{:02x}{:02x}{:02x}",
        to_channel(r),
        to_channel(g),
        to_channel(b)
    ))
}

pub(crate) fn parse_hex_rgb(hex: &str) -> Result<[u8; 3], FormatError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FormatError::InvalidInput(format!("not a hex colour: {hex:?}")));
    }

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|_| FormatError::InvalidInput(format!("not a hex colour: {hex:?}")))?;
    }
    Ok(rgb)
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn rgb_to_hls(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (min + max) / 2.0;
    if max == min {
        return (0.0, l, 0.0);
    }

    let delta = max - min;
    let s = if l <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let rc = (max - r) / delta;
    let gc = (max - g) / delta;
    let bc = (max - b) / delta;
    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    ((h / 6.0).rem_euclid(1.0), l, s)
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }

    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hue_to_channel(m1, m2, h + 1.0 / 3.0),
        hue_to_channel(m1, m2, h),
        hue_to_channel(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `5th March, 2026`, or `5th March` without the year.
pub fn format_contract_date(date: NaiveDate, include_year: bool) -> String {
    use chrono::Datelike;

    let day = date.day();
    let month = date.format("%B");
    if include_year {
        format!("{day}{} {month}, {}", ordinal_suffix(day), date.year())
    } else {
        format!("{day}{} {month}", ordinal_suffix(day))
    }
}

/// Accepts `19:30:00` or `19:30`.
pub fn parse_clock_time(text: &str) -> Result<NaiveTime, FormatError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| FormatError::InvalidInput(format!("not a time of day: {text:?}")))
}

pub fn format_stage_time(time: NaiveTime) -> String {
    let clock = time.format("%I:%M %p").to_string();
    format!(
        "From {} (1 Hour 30 Minutes + Sound Check)",
        clock.trim_start_matches('0')
    )
}
