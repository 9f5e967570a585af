use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use pest::{Parser, iterators::Pair};
use pest_derive::Parser;
use uuid::Uuid;

use crate::ast::Literal;

#[derive(Parser)]
#[grammar = "src/literal.pest"]
pub struct LiteralGrammar;

/// Recognise-and-build step for one scalar shape. `None` means "not this
/// shape", and the chain moves on to the next caster.
pub type Caster = fn(&str) -> Option<Literal>;

/// Scalar casters in priority order.
pub const CASTERS: [(&str, Caster); 7] = [
    ("int", cast_int),
    ("float", cast_float),
    ("datetime", cast_datetime),
    ("date", cast_date),
    ("time", cast_time),
    ("uuid", cast_uuid),
    ("keyword", cast_keyword),
];

/// Coerce an unquoted, unbracketed segment. Anything no caster accepts is
/// kept as a bare string, so this never fails.
pub fn coerce_scalar(segment: &str) -> Literal {
    CASTERS
        .iter()
        .find_map(|(name, cast)| {
            let value = cast(segment)?;
            tracing::trace!(segment, caster = name, "coerced scalar");
            Some(value)
        })
        .unwrap_or_else(|| Literal::String(segment.to_owned()))
}

fn recognise(rule: Rule, segment: &str) -> Option<Pair<'_, Rule>> {
    LiteralGrammar::parse(rule, segment).ok()?.next()
}

pub fn cast_int(segment: &str) -> Option<Literal> {
    recognise(Rule::integer_literal, segment)?;
    segment.parse().ok().map(Literal::Int)
}

pub fn cast_float(segment: &str) -> Option<Literal> {
    recognise(Rule::float_literal, segment)?;
    segment.parse().ok().map(Literal::Float)
}

pub fn cast_datetime(segment: &str) -> Option<Literal> {
    let pair = recognise(Rule::datetime_literal, segment)?;

    let mut date = None;
    let mut time = None;
    let mut offset = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::date => date = build_date(inner),
            Rule::time => time = build_time(inner),
            Rule::offset => offset = Some(build_offset(inner)?),
            _ => {}
        }
    }

    let naive = NaiveDateTime::new(date?, time?);
    match offset {
        Some(offset) => naive
            .and_local_timezone(offset)
            .single()
            .map(Literal::ZonedDateTime),
        None => Some(Literal::DateTime(naive)),
    }
}

/// Byte length of the date-time token that starts `text`, if there is one.
/// Its colons are part of the token, not mapping separators.
pub fn datetime_prefix_len(text: &str) -> Option<usize> {
    recognise(Rule::datetime_prefix, text).map(|pair| pair.as_span().end())
}

pub fn cast_date(segment: &str) -> Option<Literal> {
    let pair = recognise(Rule::date_literal, segment)?;
    let date = pair.into_inner().find(|p| p.as_rule() == Rule::date)?;
    build_date(date).map(Literal::Date)
}

pub fn cast_time(segment: &str) -> Option<Literal> {
    let pair = recognise(Rule::time_literal, segment)?;
    let time = pair.into_inner().find(|p| p.as_rule() == Rule::time)?;
    build_time(time).map(Literal::Time)
}

pub fn cast_uuid(segment: &str) -> Option<Literal> {
    recognise(Rule::uuid_literal, segment)?;
    Uuid::parse_str(segment).ok().map(Literal::Uuid)
}

pub fn cast_keyword(segment: &str) -> Option<Literal> {
    recognise(Rule::keyword_literal, segment)?;
    match segment {
        "True" => Some(Literal::Bool(true)),
        "False" => Some(Literal::Bool(false)),
        "None" => Some(Literal::None),
        _ => None,
    }
}

fn build_date(pair: Pair<'_, Rule>) -> Option<NaiveDate> {
    let (mut year, mut month, mut day) = (None, None, None);
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::year => year = part.as_str().parse().ok(),
            Rule::month => month = part.as_str().parse().ok(),
            Rule::day => day = part.as_str().parse().ok(),
            _ => {}
        }
    }
    NaiveDate::from_ymd_opt(year?, month?, day?)
}

fn build_time(pair: Pair<'_, Rule>) -> Option<NaiveTime> {
    let (mut hour, mut minute, mut second, mut micro) = (None, None, 0, 0);
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::hour => hour = part.as_str().parse().ok(),
            Rule::minute => minute = part.as_str().parse().ok(),
            Rule::second => second = part.as_str().parse().ok()?,
            Rule::fraction => micro = microseconds(part.as_str())?,
            _ => {}
        }
    }
    NaiveTime::from_hms_micro_opt(hour?, minute?, second, micro)
}

/// Interpret up to six fractional digits as microseconds; extra digits are
/// dropped.
fn microseconds(fraction: &str) -> Option<u32> {
    let digits: String = fraction.chars().take(6).collect();
    let scale = 10u32.pow(6 - digits.len() as u32);
    digits.parse::<u32>().ok().map(|n| n * scale)
}

fn build_offset(pair: Pair<'_, Rule>) -> Option<FixedOffset> {
    let inner = pair.into_inner().next()?;
    if inner.as_rule() == Rule::utc {
        return FixedOffset::east_opt(0);
    }

    let (mut sign, mut hours, mut minutes) = (1, 0, 0);
    for part in inner.into_inner() {
        match part.as_rule() {
            Rule::sign if part.as_str() == "-" => sign = -1,
            Rule::offset_hours => hours = part.as_str().parse::<i32>().ok()?,
            Rule::offset_minutes => minutes = part.as_str().parse::<i32>().ok()?,
            _ => {}
        }
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
