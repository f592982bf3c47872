use std::path::PathBuf;

use crate::conflict::{check_time_conflict, Conflict};
use crate::course::{coerce, Course, Field};
use crate::error::Result;
use crate::sorter::{sort_courses, SortSpec};
use crate::table::CourseTable;

const UNKNOWN_COURSE: &str = "未知课程";

fn display_name(name: Option<&Field>) -> String {
    match name.map(Field::to_string) {
        Some(name) if !name.trim().is_empty() => name,
        _ => UNKNOWN_COURSE.to_string(),
    }
}

/// Numeric ids are shown zero padded to eight digits.
fn display_id(id: Option<&Field>) -> String {
    match (coerce(id), id) {
        (Some(n), _) if n.fract() == 0.0 && n >= 0.0 => format!("{:08}", n as i64),
        (_, Some(id)) => id.to_string(),
        (_, None) => String::new(),
    }
}

fn capacity_warning(candidate: &Course) -> Option<String> {
    let enrolled = coerce(candidate.enrolled_count.as_ref()).unwrap_or(0.0);
    let capacity = coerce(candidate.capacity.as_ref())?;
    (capacity > 0.0 && enrolled >= capacity).then(|| {
        format!("该课程选课人数已超过容量，抽签难度较大，请谨慎选择（当前：{enrolled}/{capacity}）")
    })
}

fn conflict_warning(candidate: &Course, conflict: &Conflict) -> String {
    format!(
        "选课时间冲突：新选课程《{}》(课程号:{}) 与已选课程《{}》(课程号:{}) 在[{}]冲突",
        display_name(candidate.course_name.as_ref()),
        display_id(candidate.course_id.as_ref()),
        display_name(conflict.course_name.as_ref()),
        display_id(conflict.course_id.as_ref()),
        conflict.time_str,
    )
}

/// Warnings shown when pre-selecting `candidate`; `None` when there is nothing to warn about.
///
/// Warnings never block enrollment.
pub fn enrollment_warning(candidate: &Course, enrolled: &[Course]) -> Option<String> {
    let warnings: Vec<String> = capacity_warning(candidate)
        .into_iter()
        .chain(
            check_time_conflict(Some(candidate), Some(enrolled))
                .iter()
                .map(|conflict| conflict_warning(candidate, conflict)),
        )
        .collect();

    (!warnings.is_empty()).then(|| warnings.join("；"))
}

/// A catalog plus the courses a student has pre-selected from it.
pub struct Scheduler {
    table: CourseTable,
    enrolled: Vec<Course>,
}

impl Scheduler {
    pub fn new(table: CourseTable) -> Scheduler {
        Scheduler {
            table,
            enrolled: Vec::new(),
        }
    }

    pub fn load(file_path: PathBuf) -> Result<Scheduler> {
        let table = CourseTable::load(file_path)?;
        Ok(Scheduler::new(table))
    }

    pub fn table(&self) -> &CourseTable {
        &self.table
    }

    pub fn enrolled(&self) -> &[Course] {
        &self.enrolled
    }

    pub fn conflicts(&self, candidate: &Course) -> Vec<Conflict> {
        check_time_conflict(Some(candidate), Some(self.enrolled.as_slice()))
    }

    /// Adds `course` to the enrolled list and returns the warning for it, if any.
    ///
    /// Enrolling a course that is already enrolled is a no-op.
    pub fn enroll(&mut self, course: Course) -> Option<String> {
        if self.is_enrolled(course.course_id.as_ref()) {
            tracing::debug!(course_id = ?course.course_id, "already enrolled");
            return None;
        }

        let warning = enrollment_warning(&course, &self.enrolled);
        if let Some(warning) = &warning {
            tracing::warn!(course_id = ?course.course_id, %warning, "enrolled with warning");
        }
        self.enrolled.push(course);
        warning
    }

    pub fn drop_course(&mut self, course_id: &Field) -> Option<Course> {
        let idx = self
            .enrolled
            .iter()
            .position(|c| c.course_id.as_ref() == Some(course_id))?;
        Some(self.enrolled.remove(idx))
    }

    pub fn clear(&mut self) {
        self.enrolled.clear();
    }

    pub fn is_enrolled(&self, course_id: Option<&Field>) -> bool {
        self.enrolled.iter().any(|c| c.course_id.as_ref() == course_id)
    }

    /// Catalog courses not yet enrolled that fit around the enrolled ones.
    pub fn candidates(&self) -> Result<Vec<Course>> {
        let mut courses = self.table.no_conflict_with(&self.enrolled)?.courses()?;
        courses.retain(|course| !self.is_enrolled(course.course_id.as_ref()));
        Ok(courses)
    }

    pub fn sorted(&self, spec: &SortSpec) -> Result<Vec<Course>> {
        Ok(sort_courses(&self.table.courses()?, spec))
    }
}
