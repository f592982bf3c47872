use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::collate;
use crate::course::{coerce, text_of, Course, Weekday};

/// Filler for missing parts of a time key; sorts after every real slot.
const NO_SLOT: f64 = 99.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CourseId,
    InstructorName,
    Time,
    Utilization,
}

impl SortKey {
    pub fn parse(key: &str) -> Option<SortKey> {
        match key {
            "courseId" => Some(SortKey::CourseId),
            "instructorName" => Some(SortKey::InstructorName),
            "time" => Some(SortKey::Time),
            "utilization" => Some(SortKey::Utilization),
            _ => None,
        }
    }

    fn extract(self, course: &Course) -> SortValue {
        match self {
            SortKey::CourseId => match coerce(course.course_id.as_ref()) {
                Some(n) => SortValue::Number(n),
                None => SortValue::Text(text_of(course.course_id.as_ref())),
            },
            SortKey::InstructorName => {
                SortValue::Text(text_of(course.instructor_name.as_ref()).trim().to_string())
            }
            SortKey::Time => SortValue::Tuple(time_key(course)),
            SortKey::Utilization => SortValue::Number(course.utilization()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `"desc"` is descending.
    pub fn parse(order: &str) -> SortOrder {
        if order == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Sort key and direction, as sent by the course list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SortSpec {
    pub key: Option<SortKey>,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> SortSpec {
        SortSpec {
            key: Some(key),
            order,
        }
    }

    pub fn parse(key: &str, order: &str) -> SortSpec {
        SortSpec {
            key: SortKey::parse(key),
            order: SortOrder::parse(order),
        }
    }
}

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let text = |name: &str| value.get(name).and_then(Value::as_str).unwrap_or_default();
        Ok(SortSpec::parse(text("key"), text("order")))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Null,
    Number(f64),
    Text(String),
    Tuple(Vec<SortValue>),
}

impl SortValue {
    fn text(&self) -> String {
        match self {
            SortValue::Null => String::new(),
            SortValue::Number(n) => n.to_string(),
            SortValue::Text(s) => s.clone(),
            SortValue::Tuple(items) => items
                .iter()
                .map(SortValue::text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

fn time_key(course: &Course) -> Vec<SortValue> {
    let slot = |value: Option<f64>| SortValue::Number(value.unwrap_or(NO_SLOT));
    let mut min = vec![slot(None), slot(None), slot(None)];

    for session in &course.sessions {
        let rank = Weekday::from_label(text_of(session.weekday.as_ref()).trim())
            .map(|day| day.rank() as f64);
        let key = vec![
            slot(rank),
            slot(coerce(session.start_period.as_ref())),
            slot(coerce(session.end_period.as_ref())),
        ];
        if compare_tuple(&key, &min) == Ordering::Less {
            min = key;
        }
    }

    min
}

/// Nulls last, numbers by value, everything else by collated text.
fn compare_nullable(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Null, SortValue::Null) => Ordering::Equal,
        (SortValue::Null, _) => Ordering::Greater,
        (_, SortValue::Null) => Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (a, b) => collate::compare(&a.text(), &b.text()),
    }
}

fn compare_tuple(a: &[SortValue], b: &[SortValue]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            compare_nullable(
                a.get(i).unwrap_or(&SortValue::Null),
                b.get(i).unwrap_or(&SortValue::Null),
            )
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Tuple(x), SortValue::Tuple(y)) => compare_tuple(x, y),
        (SortValue::Tuple(x), y) => compare_tuple(x, std::slice::from_ref(y)),
        (x, SortValue::Tuple(y)) => compare_tuple(std::slice::from_ref(x), y),
        (x, y) => compare_nullable(x, y),
    }
}

/// Bottom-up merge sort. Keeps equal elements in place and never panics, even
/// when mixed number/text ids make `cmp` inconsistent.
fn merge_sort<T, F>(items: Vec<T>, mut cmp: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut runs: Vec<Vec<T>> = items.into_iter().map(|item| vec![item]).collect();

    while runs.len() > 1 {
        let mut merged = Vec::with_capacity(runs.len() / 2 + 1);
        let mut pending = runs.into_iter();

        while let Some(left) = pending.next() {
            let Some(right) = pending.next() else {
                merged.push(left);
                break;
            };

            let mut out = Vec::with_capacity(left.len() + right.len());
            let mut left = left.into_iter().peekable();
            let mut right = right.into_iter().peekable();
            while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
                if cmp(r, l) == Ordering::Less {
                    out.extend(right.next());
                } else {
                    out.extend(left.next());
                }
            }
            out.extend(left);
            out.extend(right);
            merged.push(out);
        }

        runs = merged;
    }

    runs.into_iter().next().unwrap_or_default()
}

/// Returns a new list ordered by `spec`; the input is untouched.
///
/// Ties keep their input order. Without a recognized key the list is returned
/// as-is.
pub fn sort_courses(courses: &[Course], spec: &SortSpec) -> Vec<Course> {
    let Some(key) = spec.key else {
        tracing::debug!("no sort key, keeping input order");
        return courses.to_vec();
    };

    let keyed: Vec<(usize, SortValue, &Course)> = courses
        .iter()
        .enumerate()
        .map(|(idx, course)| (idx, key.extract(course), course))
        .collect();

    let sorted = merge_sort(keyed, |a, b| {
        let ord = compare(&a.1, &b.1);
        let ord = match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        ord.then(a.0.cmp(&b.0))
    });

    sorted.into_iter().map(|(_, _, course)| course.clone()).collect()
}
