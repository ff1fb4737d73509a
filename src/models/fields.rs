//! Wire encodings used by the host's custom-fields (`acf`) map.
//!
//! The stored schema predates this crate and has a few quirks that must be
//! reproduced exactly at the boundary:
//!
//! - completion is a set holding the flag `"Done"`, or an empty set;
//! - due dates are `YYYYMMDD` strings written *without* zero padding
//!   (2024-03-05 is `"202435"`);
//! - ids arrive as numbers, numeric strings, `""`, `false` or `null`;
//! - a post with no field values may carry `"acf": []` instead of an object.

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// The single flag stored in `task_complete` when a todo is done.
pub const DONE_FLAG: &str = "Done";

/// A `{ "rendered": ... }` wrapper as returned for titles and content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl Rendered {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            rendered: text.into(),
        }
    }
}

/// Encodes a completion state as the stored flag set.
pub fn encode_completion(done: bool) -> Vec<String> {
    if done {
        vec![DONE_FLAG.to_string()]
    } else {
        Vec::new()
    }
}

/// Decodes a stored flag set. Only the first element is inspected.
pub fn decode_completion(value: &Value) -> bool {
    match value {
        Value::Array(flags) => flags.first().and_then(Value::as_str) == Some(DONE_FLAG),
        _ => false,
    }
}

/// `#[serde(with = "completion")]` for a `bool` stored as a flag set.
pub mod completion {
    use super::*;

    pub fn serialize<S: Serializer>(done: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        encode_completion(*done).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(decode_completion).unwrap_or(false))
    }

    /// Serializer for optional completion in partial payloads.
    pub fn serialize_opt<S: Serializer>(
        done: &Option<bool>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match done {
            Some(done) => serialize(done, serializer),
            None => serializer.serialize_none(),
        }
    }
}

/// Errors decoding a stored due date.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("due date `{0}` is not a YYYYMMDD digit string")]
    Malformed(String),
    #[error("due date `{0}` does not name a calendar day")]
    NoSuchDay(String),
}

/// Encodes a due date the way the stored schema expects: year, month and day
/// concatenated without padding.
pub fn encode_due_date(date: NaiveDate) -> String {
    format!("{}{}{}", date.year(), date.month(), date.day())
}

/// Decodes a due date written by [`encode_due_date`] or a zero-padded
/// `YYYYMMDD` string.
///
/// Seven-digit values are ambiguous when both a one- and a two-digit month
/// parse (e.g. `2024111` is November 1 or January 11). The two-digit month is
/// read first, as the widgets that display the date do. Components
/// other than a padded month/day pair never start with `0`.
pub fn decode_due_date(raw: &str) -> Result<NaiveDate, DateError> {
    let malformed = || DateError::Malformed(raw.to_string());
    if !(6..=8).contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let (year, rest) = raw.split_at(4);
    let year: i32 = year.parse().map_err(|_| malformed())?;

    let splits: &[usize] = match rest.len() {
        2 => &[1],
        3 => &[2, 1],
        _ => &[2],
    };

    for &at in splits {
        let (month, day) = rest.split_at(at);
        let padded = rest.len() == 4;
        if !padded && (month.starts_with('0') || day.starts_with('0')) {
            continue;
        }
        let (Ok(month), Ok(day)) = (month.parse::<u32>(), day.parse::<u32>()) else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
    }

    Err(DateError::NoSuchDay(raw.to_string()))
}

/// `#[serde(with = "due_date")]` for an optional due date.
pub mod due_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&encode_due_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    /// Empty and missing values decode to `None`. Undecodable values are
    /// logged and dropped so one bad record does not fail a whole collection.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Ok(None),
        };
        if raw.is_empty() {
            return Ok(None);
        }
        match decode_due_date(&raw) {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                tracing::warn!("Ignoring stored due date: {}", e);
                Ok(None)
            }
        }
    }
}

fn id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}

/// Lenient optional id: numbers and numeric strings; `0`, `""`, `false` and
/// `null` mean absent.
pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_from_value))
}

/// Lenient id list; `null` and `false` mean empty. Unparsable entries are skipped.
pub fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(id_from_value).collect(),
        Some(single) => id_from_value(&single).into_iter().collect(),
        None => Vec::new(),
    })
}

/// A custom-fields map that may arrive as `[]` when the entry has no values.
pub fn acf_map<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(T::default()),
    }
}
