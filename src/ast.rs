use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use uuid::Uuid;

use crate::splitter::closes_quote;

/// A typed value parsed from one argument segment.
///
/// Containers own their children outright; values are only ever built
/// bottom-up from text, so the tree has no sharing and no cycles.
#[derive(Debug, Clone)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// A datetime written with `Z` or an explicit `±HH:MM` offset
    ZonedDateTime(DateTime<FixedOffset>),
    Uuid(Uuid),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Unique members in first-seen order
    Set(Vec<Literal>),
    /// Unique keys in first-seen order
    Map(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::None => "none",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
            Literal::Date(_) => "date",
            Literal::Time(_) => "time",
            Literal::DateTime(_) | Literal::ZonedDateTime(_) => "datetime",
            Literal::Uuid(_) => "uuid",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Set(_) => "set",
            Literal::Map(_) => "map",
        }
    }

    /// Whether the value may be used as a map key or set member.
    pub fn is_hashable(&self) -> bool {
        match self {
            Literal::List(_) | Literal::Set(_) | Literal::Map(_) => false,
            Literal::Tuple(items) => items.iter().all(Literal::is_hashable),
            _ => true,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Literal::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a value in a map literal by key.
    pub fn get(&self, key: &Literal) -> Option<&Literal> {
        match self {
            Literal::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Text used when the value becomes a JSON object key.
    fn key_string(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// Sets and maps compare without regard to order.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::None, Literal::None) => true,
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Date(a), Literal::Date(b)) => a == b,
            (Literal::Time(a), Literal::Time(b)) => a == b,
            (Literal::DateTime(a), Literal::DateTime(b)) => a == b,
            (Literal::ZonedDateTime(a), Literal::ZonedDateTime(b)) => a == b,
            (Literal::Uuid(a), Literal::Uuid(b)) => a == b,
            (Literal::List(a), Literal::List(b)) | (Literal::Tuple(a), Literal::Tuple(b)) => a == b,
            (Literal::Set(a), Literal::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Literal::Map(a), Literal::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.iter().any(|(ok, ov)| k == ok && v == ov))
            }
            _ => false,
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_owned())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<Uuid> for Literal {
    fn from(value: Uuid) -> Self {
        Literal::Uuid(value)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(value: NaiveDateTime) -> Self {
        Literal::DateTime(value)
    }
}

impl From<Vec<Literal>> for Literal {
    fn from(value: Vec<Literal>) -> Self {
        Literal::List(value)
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Whether `text` wrapped in `quote` scans back as one string holding `text`.
fn quotable(text: &str, quote: char) -> bool {
    let mut escaped = false;
    for (pos, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            let rest = &text[pos + ch.len_utf8()..];
            if !rest.trim_start().is_empty() && closes_quote(rest) {
                return false;
            }
        }
    }
    !escaped
}

/// Renders values in the literal syntax the parser accepts. Strings take
/// whichever quote character reads back unchanged. An empty set and a set of
/// times print as `{}` and `{01:02:03}`, which read back as mappings.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => f.write_str("None"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{n:.1}"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::String(s)
                if quotable(s, '"') && (s.contains('\'') || !quotable(s, '\'')) =>
            {
                write!(f, "\"{s}\"")
            }
            Literal::String(s) => write!(f, "'{s}'"),
            Literal::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Literal::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Literal::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Literal::ZonedDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f%:z")),
            Literal::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Literal::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            Literal::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Literal::Set(items) => {
                f.write_str("{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            Literal::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// JSON-friendly encoding: temporal values and UUIDs become ISO/hyphenated
/// strings, tuples and sets become arrays, map keys are stringified.
impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::None => serializer.serialize_unit(),
            Literal::Bool(b) => serializer.serialize_bool(*b),
            Literal::Int(n) => serializer.serialize_i64(*n),
            Literal::Float(n) => serializer.serialize_f64(*n),
            Literal::String(s) => serializer.serialize_str(s),
            Literal::Date(_)
            | Literal::Time(_)
            | Literal::DateTime(_)
            | Literal::ZonedDateTime(_)
            | Literal::Uuid(_) => serializer.collect_str(self),
            Literal::List(items) | Literal::Tuple(items) | Literal::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Literal::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&key.key_string(), value)?;
                }
                map.end()
            }
        }
    }
}
