use polars::{lazy::dsl::col, prelude::*};
use std::{ops::Deref, path::PathBuf};

use crate::conflict::check_time_conflict;
use crate::course::{Course, Field, Session};
use crate::error::Result;

pub const COURSE_ID: &str = "COURSE ID";
pub const COURSE_NAME: &str = "COURSE NAME";
pub const INSTRUCTOR: &str = "INSTRUCTOR";
pub const START_WEEK: &str = "START WEEK";
pub const END_WEEK: &str = "END WEEK";
pub const ENROLLED: &str = "ENROLLED";
pub const CAPACITY: &str = "CAPACITY";
pub const SESSIONS: &str = "SESSIONS";

const COLUMNS: [&str; 8] = [
    COURSE_ID,
    COURSE_NAME,
    INSTRUCTOR,
    START_WEEK,
    END_WEEK,
    ENROLLED,
    CAPACITY,
    SESSIONS,
];

fn cell(row: &[AnyValue], idx: usize) -> Option<String> {
    match row.get(idx)? {
        AnyValue::Null => None,
        value => {
            let text = value.to_string().replace('"', "");
            (!text.trim().is_empty()).then_some(text)
        }
    }
}

fn field(row: &[AnyValue], idx: usize) -> Option<Field> {
    cell(row, idx).map(|s| Field::from_cell(&s))
}

/// Course catalog backed by a `DataFrame`.
///
/// Text columns are kept as text; every other cell is read loosely into a
/// [`Course`] the same way API payloads are.
#[derive(Clone)]
pub struct CourseTable {
    df: DataFrame,
}

impl CourseTable {
    pub fn new(df: DataFrame) -> CourseTable {
        CourseTable { df }
    }

    pub fn load(file_path: PathBuf) -> Result<CourseTable> {
        tracing::debug!(path = %file_path.display(), "loading course catalog");
        let df = LazyCsvReader::new(file_path)
            .has_header(true)
            .finish()?
            .with_column(col(COURSE_ID).cast(DataType::String))
            .with_column(col(INSTRUCTOR).cast(DataType::String))
            .with_column(col(SESSIONS).cast(DataType::String))
            .collect()?;

        Ok(CourseTable { df })
    }

    pub fn to_lazy(&self) -> LazyTable {
        LazyTable::new(self.df.clone().lazy())
    }

    pub fn courses(&self) -> Result<Vec<Course>> {
        let df = self.df.select(COLUMNS)?;

        let mut courses = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let Some(row) = df.get(i) else { continue };

            courses.push(Course {
                course_id: field(&row, 0),
                course_name: cell(&row, 1).map(Field::Text),
                instructor_name: cell(&row, 2).map(Field::Text),
                start_week: field(&row, 3),
                end_week: field(&row, 4),
                enrolled_count: field(&row, 5),
                capacity: field(&row, 6),
                sessions: cell(&row, 7)
                    .map(|text| Session::parse_list(&text))
                    .unwrap_or_default(),
            });
        }

        Ok(courses)
    }

    pub fn get_course(&self, course_id: &str) -> Result<Option<Course>> {
        let table = self.to_lazy().with_id(course_id).collect()?;
        Ok(table.courses()?.into_iter().next())
    }

    /// Rows that do not clash with any of `enrolled`.
    pub fn no_conflict_with(&self, enrolled: &[Course]) -> Result<CourseTable> {
        let keep: Vec<bool> = self
            .courses()?
            .iter()
            .map(|course| check_time_conflict(Some(course), Some(enrolled)).is_empty())
            .collect();

        let mask = BooleanChunked::from_slice("keep", &keep);
        let df = self.df.filter(&mask)?;
        tracing::debug!(kept = df.height(), total = self.df.height(), "filtered conflicting rows");

        Ok(CourseTable { df })
    }
}

impl Deref for CourseTable {
    type Target = DataFrame;

    fn deref(&self) -> &Self::Target {
        &self.df
    }
}

impl std::fmt::Display for CourseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.df)
    }
}

pub struct LazyTable {
    lf: LazyFrame,
}

impl LazyTable {
    pub fn new(lf: LazyFrame) -> Self {
        LazyTable { lf }
    }

    /// Courses whose id starts with one of `prefixes`.
    pub fn contains(self, prefixes: &[&str]) -> Self {
        let escaped: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
        let pattern = format!("^({})", escaped.join("|"));

        let lf = self
            .lf
            .filter(col(COURSE_ID).str().contains(lit(pattern), false));

        LazyTable { lf }
    }

    pub fn with_id(self, course_id: &str) -> Self {
        let lf = self.lf.filter(col(COURSE_ID).eq(lit(course_id)));
        LazyTable { lf }
    }

    pub fn taught_by(self, instructor: &str) -> Self {
        let lf = self.lf.filter(col(INSTRUCTOR).eq(lit(instructor)));
        LazyTable { lf }
    }

    /// Courses still below capacity.
    pub fn with_seats(self) -> Self {
        let lf = self.lf.filter(col(ENROLLED).lt(col(CAPACITY)));
        LazyTable { lf }
    }

    pub fn collect(self) -> Result<CourseTable> {
        let df = self.lf.collect()?;
        Ok(CourseTable { df })
    }
}

impl Deref for LazyTable {
    type Target = LazyFrame;

    fn deref(&self) -> &Self::Target {
        &self.lf
    }
}
