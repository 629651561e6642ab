use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

/// A string-keyed bag of raw source values: one CSV row, one XLSX row, or
/// a hand-assembled record. Lookups are case-insensitive because source
/// exports disagree about header casing ("Email" vs "EMAIL" vs "email").
///
/// Every getter degrades to a documented default instead of failing —
/// one malformed cell must not abort a migration run.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    values: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record by pairing a CSV header row with a data row.
    /// Extra data cells beyond the header are ignored; missing cells
    /// simply leave their keys absent.
    pub fn from_csv(headers: &csv::StringRecord, row: &csv::StringRecord) -> Self {
        let mut rec = Self::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            rec.insert(header, value);
        }
        rec
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.trim().to_lowercase(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Every key present in the record, lowercased.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Trimmed string; empty when the key is absent.
    pub fn string(&self, key: &str) -> String {
        self.raw(key).map(str::trim).unwrap_or_default().to_string()
    }

    /// Trimmed string, or None when absent or blank.
    pub fn opt_string(&self, key: &str) -> Option<String> {
        let s = self.string(key);
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Case-insensitive boolean: {true, yes, y, on, 1} and
    /// {false, no, n, off, 0}; anything else is the default.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.string(key).to_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => true,
            "false" | "no" | "n" | "off" | "0" => false,
            _ => default,
        }
    }

    pub fn opt_i64(&self, key: &str) -> Option<i64> {
        self.string(key).parse().ok()
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.opt_i64(key).unwrap_or(default)
    }

    /// Currency-tolerant decimal parse: strips $, commas and quotes, and
    /// reads a parenthesized value as negative. Unparsable cells are 0.
    pub fn amount(&self, key: &str) -> f64 {
        self.opt_amount(key).unwrap_or(0.0)
    }

    pub fn opt_amount(&self, key: &str) -> Option<f64> {
        parse_amount(self.raw(key)?)
    }

    /// Date parse over the formats that show up in ChMS exports:
    /// ISO, M/D/YYYY and M/D/YY. None on anything else.
    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        parse_date(&self.string(key))
    }

    pub fn datetime(&self, key: &str) -> Option<NaiveDateTime> {
        parse_datetime(&self.string(key))
    }
}

pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    // Timestamped cells still carry a usable date part.
    parse_datetime(raw).map(|dt| dt.date())
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    None
}
