use serde::Serialize;

use crate::course::{text_of, Course, Field};

/// Row shape rendered by the course list view.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    pub course_id: Option<Field>,
    pub course_name: String,
    pub instructor_name: String,
    pub weeks: String,
    pub time_str: String,
    pub utilization: f64,
}

impl From<&Course> for CourseInfo {
    fn from(course: &Course) -> Self {
        let (start, end) = course.week_range();
        CourseInfo {
            course_id: course.course_id.clone(),
            course_name: text_of(course.course_name.as_ref()),
            instructor_name: text_of(course.instructor_name.as_ref()).trim().to_string(),
            weeks: format!("{start}-{end}周"),
            time_str: course.time_str(),
            utilization: course.utilization(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct CourseList {
    pub courses: Vec<CourseInfo>,
}

impl CourseList {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> FromIterator<&'a Course> for CourseList {
    fn from_iter<I: IntoIterator<Item = &'a Course>>(iter: I) -> Self {
        CourseList {
            courses: iter.into_iter().map(CourseInfo::from).collect(),
        }
    }
}

impl std::fmt::Display for CourseList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for info in &self.courses {
            writeln!(
                f,
                "{:<10} {:<16} {:<8} {:<8} {:>6.2}  {}",
                text_of(info.course_id.as_ref()),
                info.course_name,
                info.instructor_name,
                info.weeks,
                info.utilization,
                info.time_str
            )?;
        }
        Ok(())
    }
}
