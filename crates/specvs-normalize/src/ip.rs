//! Ingress protection (IP) ratings.

use regex::Regex;
use serde_json::Value;
use specvs_types::Normalized;
use std::sync::LazyLock;

static IP_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bIP\s*([0-6X])([0-9X])\b").expect("ip rating pattern is valid")
});

/// Parsed `IP<dust><water>` code. `None` digits were given as `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRating {
    pub dust: Option<u8>,
    pub water: Option<u8>,
}

impl IpRating {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = IP_CODE.captures(text)?;
        let digit = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().chars().next())
                .and_then(|c| c.to_digit(10))
                .map(|d| d as u8)
        };
        Some(IpRating {
            dust: digit(1),
            water: digit(2),
        })
    }

    /// `water * 10 + (dust digit present ? 1 : 0)`: water dominates, dust breaks ties.
    pub fn score(self) -> f64 {
        let water = f64::from(self.water.unwrap_or(0));
        let dust = if self.dust.is_some() { 1.0 } else { 0.0 };
        water * 10.0 + dust
    }

    /// Canonical `IP55` / `IPX5` spelling.
    pub fn code(self) -> String {
        let d = |v: Option<u8>| v.map_or_else(|| "X".to_string(), |v| v.to_string());
        format!("IP{}{}", d(self.dust), d(self.water))
    }
}

/// Score of a rating string; unparseable, empty or non-string input scores 0.
pub fn score_text(text: &str) -> f64 {
    IpRating::parse(text).map_or(0.0, IpRating::score)
}

pub fn normalize(value: &Value) -> Option<Normalized> {
    let score = value.as_str().map_or(0.0, score_text);
    Some(Normalized::Number(score))
}
