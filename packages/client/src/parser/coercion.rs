//! Text to scalar coercion registry
//!
//! Every text-bound field resolves to one [`ScalarKind`] when its pattern
//! table is built. Parsing then goes straight through [`ScalarKind::coerce`]
//! without inspecting the Rust type again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

/// Closed set of scalar kinds that can be read from text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Long,
    Float,
    Double,
    Bool,
    Char,
    Date,
    Decimal,
    String,
}

/// A coerced scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    Date(DateTime<Utc>),
    Decimal(Decimal),
    String(String),
}

/// Text that does not parse as the declared kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot read {text:?} as {kind:?}: {reason}")]
pub struct CoercionError {
    pub kind: ScalarKind,
    pub text: String,
    pub reason: String,
}

impl CoercionError {
    fn new(kind: ScalarKind, text: &str, reason: impl fmt::Display) -> Self {
        Self {
            kind,
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<CoercionError> for crate::error::Error {
    fn from(err: CoercionError) -> Self {
        crate::error::data_format(err)
    }
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 9] = [
        ScalarKind::Int,
        ScalarKind::Long,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::Bool,
        ScalarKind::Char,
        ScalarKind::Date,
        ScalarKind::Decimal,
        ScalarKind::String,
    ];

    /// Whether element text is trimmed before coercion; strings and
    /// characters are taken verbatim so whitespace survives
    #[inline]
    #[must_use]
    pub fn trims_text(self) -> bool {
        !matches!(self, ScalarKind::String | ScalarKind::Char)
    }

    /// Read `text` as a value of this kind
    ///
    /// # Errors
    ///
    /// Returns `CoercionError` when the text is not a valid literal of the kind.
    pub fn coerce(self, text: &str) -> Result<Value, CoercionError> {
        match self {
            ScalarKind::Int => text
                .parse()
                .map(Value::Int)
                .map_err(|e| CoercionError::new(self, text, e)),
            ScalarKind::Long => text
                .parse()
                .map(Value::Long)
                .map_err(|e| CoercionError::new(self, text, e)),
            ScalarKind::Float => text
                .parse()
                .map(Value::Float)
                .map_err(|e| CoercionError::new(self, text, e)),
            ScalarKind::Double => text
                .parse()
                .map(Value::Double)
                .map_err(|e| CoercionError::new(self, text, e)),
            ScalarKind::Bool => parse_bool(text)
                .map(Value::Bool)
                .ok_or_else(|| CoercionError::new(self, text, "expected true, false, 1 or 0")),
            ScalarKind::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Ok(Value::Char(ch)),
                    _ => Err(CoercionError::new(self, text, "expected exactly one character")),
                }
            }
            ScalarKind::Date => parse_date(text)
                .map(Value::Date)
                .ok_or_else(|| {
                    CoercionError::new(self, text, "expected an ISO 8601 date or date-time")
                }),
            ScalarKind::Decimal => Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map(Value::Decimal)
                .map_err(|e| CoercionError::new(self, text, e)),
            ScalarKind::String => Ok(Value::String(text.to_string())),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text == "1" || text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text == "0" || text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Value::Int(_) => ScalarKind::Int,
            Value::Long(_) => ScalarKind::Long,
            Value::Float(_) => ScalarKind::Float,
            Value::Double(_) => ScalarKind::Double,
            Value::Bool(_) => ScalarKind::Bool,
            Value::Char(_) => ScalarKind::Char,
            Value::Date(_) => ScalarKind::Date,
            Value::Decimal(_) => ScalarKind::Decimal,
            Value::String(_) => ScalarKind::String,
        }
    }
}

/// Renders the text form that [`ScalarKind::coerce`] reads back
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Date(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

/// Rust types that a text-bound field can hold.
///
/// `kind` selects the coercion used when no transform is declared; types
/// returning `None` can only be bound with [`Declaration::text_with`].
/// `null` is the value a nil-marked element stores; `None` leaves the field
/// as it was.
///
/// [`Declaration::text_with`]: super::Declaration::text_with
pub trait XmlValue: Sized + Send + 'static {
    fn kind() -> Option<ScalarKind> {
        None
    }

    fn from_value(value: Value) -> Option<Self> {
        let _ = value;
        None
    }

    fn null() -> Option<Self> {
        None
    }
}

macro_rules! xml_value {
    ($ty:ty, $kind:ident, $null:expr) => {
        impl XmlValue for $ty {
            #[inline]
            fn kind() -> Option<ScalarKind> {
                Some(ScalarKind::$kind)
            }

            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn null() -> Option<Self> {
                $null
            }
        }
    };
}

xml_value!(i32, Int, Some(0));
xml_value!(i64, Long, Some(0));
xml_value!(f32, Float, Some(0.0));
xml_value!(f64, Double, Some(0.0));
xml_value!(bool, Bool, Some(false));
xml_value!(char, Char, Some('\0'));
xml_value!(String, String, Some(String::new()));
xml_value!(DateTime<Utc>, Date, None);
xml_value!(Decimal, Decimal, None);

impl XmlValue for NaiveDate {
    fn kind() -> Option<ScalarKind> {
        Some(ScalarKind::Date)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(v) => Some(v.date_naive()),
            _ => None,
        }
    }
}

impl<V: XmlValue> XmlValue for Option<V> {
    fn kind() -> Option<ScalarKind> {
        V::kind()
    }

    fn from_value(value: Value) -> Option<Self> {
        V::from_value(value).map(Some)
    }

    fn null() -> Option<Self> {
        Some(None)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_every_kind_reads_back_what_it_renders() {
        let samples = [
            Value::Int(-42),
            Value::Long(9_007_199_254_740_993),
            Value::Float(3.25),
            Value::Double(-0.1),
            Value::Bool(true),
            Value::Bool(false),
            Value::Char('é'),
            Value::Date(Utc.with_ymd_and_hms(2024, 2, 29, 13, 5, 9).unwrap()),
            Value::Decimal(Decimal::from_str("12345.6789").unwrap()),
            Value::String("  keep me  ".to_string()),
        ];

        for value in samples {
            let text = value.to_string();
            assert_eq!(value.kind().coerce(&text).unwrap(), value, "via {text:?}");
        }
    }

    #[test]
    fn test_bool_accepts_numeric_forms() {
        assert_eq!(ScalarKind::Bool.coerce("1").unwrap(), Value::Bool(true));
        assert_eq!(ScalarKind::Bool.coerce("FALSE").unwrap(), Value::Bool(false));
        assert!(ScalarKind::Bool.coerce("yes").is_err());
    }

    #[test]
    fn test_date_forms() {
        let midnight = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(ScalarKind::Date.coerce("2023-07-01").unwrap(), Value::Date(midnight));
        assert_eq!(
            ScalarKind::Date.coerce("2023-07-01T00:00:00").unwrap(),
            Value::Date(midnight)
        );
        assert_eq!(
            ScalarKind::Date.coerce("2023-07-01T02:00:00+02:00").unwrap(),
            Value::Date(midnight)
        );
        assert!(ScalarKind::Date.coerce("yesterday").is_err());
    }

    #[test]
    fn test_bad_text_is_reported_with_kind() {
        let err = ScalarKind::Int.coerce("12a").unwrap_err();
        assert_eq!(err.kind, ScalarKind::Int);
        assert_eq!(err.text, "12a");
        assert!(ScalarKind::Char.coerce("ab").is_err());
        assert!(ScalarKind::Decimal.coerce("1.2.3").is_err());
    }

    #[test]
    fn test_null_equivalents() {
        assert_eq!(i32::null(), Some(0));
        assert_eq!(f64::null(), Some(0.0));
        assert_eq!(bool::null(), Some(false));
        assert_eq!(char::null(), Some('\0'));
        assert_eq!(String::null(), Some(String::new()));
        assert_eq!(<Option<Decimal>>::null(), Some(None));
        assert_eq!(Decimal::null(), None);
        assert_eq!(<DateTime<Utc>>::null(), None);
    }

    #[test]
    fn test_string_and_char_keep_whitespace() {
        for kind in ScalarKind::ALL {
            let verbatim = matches!(kind, ScalarKind::String | ScalarKind::Char);
            assert_eq!(kind.trims_text(), !verbatim);
        }
        assert_eq!(ScalarKind::Char.coerce(" "), Ok(Value::Char(' ')));
    }
}
