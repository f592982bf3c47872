use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::error::Result;

pub const DEFAULT_START_WEEK: i64 = 1;
pub const DEFAULT_END_WEEK: i64 = 16;

/// A loosely typed scalar as it arrives from the REST API.
///
/// Ids, periods and week numbers show up as numbers or strings depending on
/// which endpoint produced them, so every scalar is kept as-is and normalized
/// at the point of use.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Number(f64),
    Text(String),
    /// An explicit JSON `null` id, kept apart from a missing one.
    Null,
}

impl Field {
    pub fn from_json(value: &Value) -> Option<Field> {
        match value {
            Value::Number(n) => n.as_f64().map(Field::Number),
            Value::String(s) => Some(Field::Text(s.clone())),
            Value::Bool(b) => Some(Field::Number(if *b { 1.0 } else { 0.0 })),
            _ => None,
        }
    }

    /// Catalog cells are text; numeric-looking cells become numbers.
    pub fn from_cell(cell: &str) -> Field {
        let trimmed = cell.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && !trimmed.is_empty() => Field::Number(n),
            _ => Field::Text(cell.to_string()),
        }
    }

    /// Numeric coercion. Blank text counts as zero, non-finite values as nothing.
    pub fn number(&self) -> Option<f64> {
        let n = match self {
            Field::Null => return None,
            Field::Number(n) => *n,
            Field::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>().ok()?
                }
            }
        };

        n.is_finite().then_some(n)
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Field::Text(s) if s.is_empty())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        match self {
            Field::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => serializer.serialize_i64(*n as i64),
            Field::Number(n) => serializer.serialize_f64(*n),
            Field::Text(s) => serializer.serialize_str(s),
            Field::Null => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(n) => write!(f, "{n}"),
            Field::Text(s) => write!(f, "{s}"),
            Field::Null => Ok(()),
        }
    }
}

impl From<i64> for Field {
    fn from(n: i64) -> Self {
        Field::Number(n as f64)
    }
}

impl From<i32> for Field {
    fn from(n: i32) -> Self {
        Field::Number(f64::from(n))
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

/// Numeric value of an optional field; absent and empty-text fields have none.
pub fn coerce(field: Option<&Field>) -> Option<f64> {
    match field {
        None => None,
        Some(f) if f.is_empty_text() => None,
        Some(f) => f.number(),
    }
}

/// String form of an optional field, empty when absent.
pub fn text_of(field: Option<&Field>) -> String {
    field.map(Field::to_string).unwrap_or_default()
}

fn loose<'de, D>(deserializer: D) -> core::result::Result<Option<Field>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Field::from_json(&value))
}

fn loose_id<'de, D>(deserializer: D) -> core::result::Result<Option<Field>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Some(Field::Null),
        other => Field::from_json(&other),
    })
}

fn loose_sessions<'de, D>(deserializer: D) -> core::result::Result<Vec<Session>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday = 1,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

static WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

static WEEKDAY_LABELS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

static DAY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(周|星期|礼拜)\s*([一二三四五六日天])").expect("weekday pattern is valid")
});

impl Weekday {
    pub fn from_rank(rank: i64) -> Option<Weekday> {
        match rank {
            1..=7 => Some(WEEKDAYS[(rank - 1) as usize]),
            _ => None,
        }
    }

    pub fn from_numeral(ch: char) -> Option<Weekday> {
        let rank = match ch {
            '一' => 1,
            '二' => 2,
            '三' => 3,
            '四' => 4,
            '五' => 5,
            '六' => 6,
            '日' | '天' => 7,
            _ => return None,
        };
        Weekday::from_rank(rank)
    }

    /// Accepts `1`..`7`, `"3"`, `"周三"`, `"星期三"`, `"礼拜天"` and a bare `"三"`.
    pub fn parse(field: &Field) -> Option<Weekday> {
        if field.is_empty_text() {
            return None;
        }

        if let Some(n) = field.number() {
            if n.fract() == 0.0 && (1.0..=7.0).contains(&n) {
                return Weekday::from_rank(n as i64);
            }
        }

        let raw = field.to_string();
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(caps) = DAY_MARKER.captures(raw) {
            return caps
                .get(2)
                .and_then(|m| m.as_str().chars().next())
                .and_then(Weekday::from_numeral);
        }

        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Weekday::from_numeral(ch),
            _ => None,
        }
    }

    /// Rank of an exact display label ("周一".."周日").
    pub fn from_label(label: &str) -> Option<Weekday> {
        WEEKDAY_LABELS
            .iter()
            .position(|l| *l == label)
            .and_then(|i| Weekday::from_rank(i as i64 + 1))
    }

    pub fn rank(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        WEEKDAY_LABELS[(self.rank() - 1) as usize]
    }
}

/// Which weeks of the course's week range a session meets in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekType {
    #[default]
    All,
    Odd,
    Even,
}

impl WeekType {
    pub fn parse(field: Option<&Field>) -> WeekType {
        match field.and_then(Field::number) {
            Some(n) if n == 1.0 => WeekType::Odd,
            Some(n) if n == 2.0 => WeekType::Even,
            _ => WeekType::All,
        }
    }

    pub fn matches(self, week: i64) -> bool {
        match self {
            WeekType::All => true,
            WeekType::Odd => week.rem_euclid(2) == 1,
            WeekType::Even => week.rem_euclid(2) == 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeekType::All => "",
            WeekType::Odd => "(单)",
            WeekType::Even => "(双)",
        }
    }
}

/// One weekly meeting slot of a course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub start_period: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub end_period: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub week_type: Option<Field>,
}

static SESSION_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<day>[^\s(]+?)\s*(?:(?P<start>\d+)\s*-\s*(?P<end>\d+)\s*节)?\s*(?:\((?P<parity>[单双])\))?$",
    )
    .expect("session pattern is valid")
});

impl Session {
    pub fn new(weekday: impl Into<Field>, start_period: i64, end_period: i64) -> Session {
        Session {
            weekday: Some(weekday.into()),
            start_period: Some(start_period.into()),
            end_period: Some(end_period.into()),
            week_type: None,
        }
    }

    pub fn with_week_type(mut self, week_type: WeekType) -> Session {
        self.week_type = match week_type {
            WeekType::All => None,
            WeekType::Odd => Some(Field::from(1)),
            WeekType::Even => Some(Field::from(2)),
        };
        self
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.weekday.as_ref().and_then(Weekday::parse)
    }

    /// Inclusive period range, when both ends are usable numbers.
    pub fn periods(&self) -> Option<(f64, f64)> {
        Some((
            coerce(self.start_period.as_ref())?,
            coerce(self.end_period.as_ref())?,
        ))
    }

    pub fn week_type(&self) -> WeekType {
        WeekType::parse(self.week_type.as_ref())
    }

    fn weekday_label(&self) -> String {
        match (self.weekday(), &self.weekday) {
            (Some(day), _) => day.label().to_string(),
            (None, None) => "周?".to_string(),
            (None, Some(raw)) => raw.to_string(),
        }
    }

    /// Human readable slot, e.g. `周一 1-2节(单)`.
    pub fn label(&self) -> String {
        let day = self.weekday_label();
        let parity = self.week_type().label();
        match self.periods() {
            Some((start, end)) => format!("{day} {start}-{end}节{parity}"),
            None => format!("{day}{parity}"),
        }
    }

    /// Reads back a single slot written by [`Session::label`].
    pub fn parse(text: &str) -> Option<Session> {
        let caps = SESSION_TEXT.captures(text.trim())?;

        let day = caps.name("day")?.as_str();
        let number = |name: &str| {
            caps.name(name)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .map(Field::from)
        };
        let week_type = match caps.name("parity").map(|m| m.as_str()) {
            Some("单") => WeekType::Odd,
            Some("双") => WeekType::Even,
            _ => WeekType::All,
        };

        let session = Session {
            weekday: (day != "周?").then(|| Field::from(day)),
            start_period: number("start"),
            end_period: number("end"),
            week_type: None,
        };
        Some(session.with_week_type(week_type))
    }

    /// Reads a comma separated list of slots, skipping the ones it cannot read.
    pub fn parse_list(text: &str) -> Vec<Session> {
        text.split([',', '，'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| {
                let session = Session::parse(part);
                if session.is_none() {
                    tracing::warn!(slot = part, "unreadable session slot");
                }
                session
            })
            .collect()
    }
}

/// Joins the labels of a session list, e.g. `周一 1-2节(单), 周三 3-4节`.
pub fn format_sessions(sessions: &[Session]) -> String {
    sessions
        .iter()
        .map(Session::label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize_week(field: Option<&Field>, fallback: i64) -> i64 {
    match field.and_then(Field::number) {
        Some(n) if n >= 1.0 => n.trunc() as i64,
        _ => fallback,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, deserialize_with = "loose_id", skip_serializing_if = "Option::is_none")]
    pub course_id: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub course_name: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub start_week: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub end_week: Option<Field>,
    #[serde(default, deserialize_with = "loose_sessions")]
    pub sessions: Vec<Session>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub enrolled_count: Option<Field>,
    #[serde(default, deserialize_with = "loose", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Field>,
}

impl Course {
    pub fn new(course_id: impl Into<Field>, course_name: &str) -> Course {
        Course {
            course_id: Some(course_id.into()),
            course_name: Some(course_name.into()),
            ..Course::default()
        }
    }

    pub fn with_weeks(mut self, start_week: i64, end_week: i64) -> Course {
        self.start_week = Some(start_week.into());
        self.end_week = Some(end_week.into());
        self
    }

    pub fn with_session(mut self, session: Session) -> Course {
        self.sessions.push(session);
        self
    }

    /// Lenient: a payload that is not an object yields an empty course.
    pub fn from_json(value: &Value) -> Course {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn start_week(&self) -> i64 {
        normalize_week(self.start_week.as_ref(), DEFAULT_START_WEEK)
    }

    pub fn end_week(&self) -> i64 {
        normalize_week(self.end_week.as_ref(), DEFAULT_END_WEEK)
    }

    pub fn week_range(&self) -> (i64, i64) {
        (self.start_week(), self.end_week())
    }

    pub fn time_str(&self) -> String {
        format_sessions(&self.sessions)
    }

    /// `enrolled / capacity`, or the raw enrolled count when there is no usable capacity.
    pub fn utilization(&self) -> f64 {
        let enrolled = coerce(self.enrolled_count.as_ref()).unwrap_or(0.0);
        match coerce(self.capacity.as_ref()) {
            Some(capacity) if capacity > 0.0 => enrolled / capacity,
            _ => enrolled,
        }
    }
}

/// Parses a course list payload. Anything other than a JSON array is an empty list.
pub fn courses_from_json(payload: &str) -> Result<Vec<Course>> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(match value {
        Value::Array(items) => items.iter().map(Course::from_json).collect(),
        _ => Vec::new(),
    })
}
