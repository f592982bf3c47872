//! Schedule logic for course pre-selection: timetable conflict checks,
//! course list ordering and a CSV-backed course catalog.

pub mod collate;
pub mod conflict;
pub mod course;
pub mod error;
pub mod scheduler;
pub mod serialize;
pub mod sorter;
pub mod table;

pub use conflict::{check_time_conflict, Conflict};
pub use course::{courses_from_json, Course, Field, Session, WeekType, Weekday};
pub use error::{Error, Result};
pub use scheduler::{enrollment_warning, Scheduler};
pub use serialize::{CourseInfo, CourseList};
pub use sorter::{sort_courses, SortKey, SortOrder, SortSpec};
pub use table::{CourseTable, LazyTable};
