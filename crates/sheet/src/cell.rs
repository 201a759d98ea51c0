use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a cell value in a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A date or date-time cell. Stays distinct from `Float` even though
    /// Excel stores it as a serial number.
    Date(NaiveDateTime),
}

impl CellValue {
    /// Strict numeric view: only `Int` and `Float` qualify.
    /// Text that happens to look like a number is rejected.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Date(dt) => format_date(dt),
        }
    }
}

/// `2024-01-15` for midnight values, `2024-01-15 09:30:00` otherwise.
fn format_date(dt: &NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Date(dt) => write!(f, "{}", format_date(dt)),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Date(dt)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_as_number_is_strict() {
        assert_eq!(CellValue::Int(4).as_number(), Some(4.0));
        assert_eq!(CellValue::Float(2.5).as_number(), Some(2.5));
        assert_eq!(CellValue::String("4".to_string()).as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Null.as_number(), None);
        assert_eq!(CellValue::Date(date(2024, 1, 15)).as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Int(7).to_string(), "7");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5");
        assert_eq!(CellValue::from("acc").to_string(), "acc");
    }

    #[test]
    fn test_date_display() {
        assert_eq!(CellValue::Date(date(2024, 1, 15)).to_string(), "2024-01-15");
        let stamped = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(CellValue::from(stamped).as_str(), "2024-01-15 09:30:00");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(3)), CellValue::Int(3));
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            CellValue::Int(1),
            CellValue::from("a"),
            CellValue::Null,
        ])
        .unwrap();
        assert_eq!(json, r#"[1,"a",null]"#);
    }
}
