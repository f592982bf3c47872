use serde::Serialize;

use crate::course::{Course, Field, Session, WeekType};

/// An enrolled course that collides with a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub course_id: Option<Field>,
    pub course_name: Option<Field>,
    pub time_str: String,
}

impl From<&Course> for Conflict {
    fn from(course: &Course) -> Self {
        Conflict {
            course_id: course.course_id.clone(),
            course_name: course.course_name.clone(),
            time_str: course.time_str(),
        }
    }
}

/// Whether some week in `start..=end` satisfies both week types.
///
/// Constant time: week bounds come from payloads and may be arbitrarily large.
fn weeks_intersect(start: i64, end: i64, a: WeekType, b: WeekType) -> bool {
    if start > end {
        return false;
    }
    let needed = match (a, b) {
        (WeekType::All, WeekType::All) => return true,
        (WeekType::Odd, WeekType::Even) | (WeekType::Even, WeekType::Odd) => return false,
        (WeekType::All, other) | (other, _) => other,
    };
    end > start || needed.matches(start)
}

fn sessions_collide(a: &Session, b: &Session, weeks: (i64, i64)) -> bool {
    let (Some(day_a), Some(day_b)) = (a.weekday(), b.weekday()) else {
        return false;
    };
    if day_a != day_b {
        return false;
    }

    let (Some((a_start, a_end)), Some((b_start, b_end))) = (a.periods(), b.periods()) else {
        return false;
    };
    if !(a_start <= b_end && b_start <= a_end) {
        return false;
    }

    weeks_intersect(weeks.0, weeks.1, a.week_type(), b.week_type())
}

impl Course {
    /// Overlapping week range with `other`, if any.
    pub fn shared_weeks(&self, other: &Course) -> Option<(i64, i64)> {
        let (a_start, a_end) = self.week_range();
        let (b_start, b_end) = other.week_range();
        let start = a_start.max(b_start);
        let end = a_end.min(b_end);
        (start <= end).then_some((start, end))
    }

    /// True when some pair of sessions meets at the same time in a shared week.
    pub fn conflict_with(&self, other: &Course) -> bool {
        let Some(weeks) = self.shared_weeks(other) else {
            return false;
        };

        self.sessions.iter().any(|mine| {
            other
                .sessions
                .iter()
                .any(|theirs| sessions_collide(mine, theirs, weeks))
        })
    }
}

/// Enrolled courses whose meeting times overlap `candidate`, in input order.
///
/// An enrolled entry with the candidate's own id is never reported.
pub fn check_time_conflict(candidate: Option<&Course>, enrolled: Option<&[Course]>) -> Vec<Conflict> {
    let (Some(candidate), Some(enrolled)) = (candidate, enrolled) else {
        return Vec::new();
    };

    enrolled
        .iter()
        .filter(|course| {
            if course.course_id == candidate.course_id {
                tracing::trace!(course_id = ?course.course_id, "skipping candidate itself");
                return false;
            }
            true
        })
        .filter(|course| candidate.conflict_with(course))
        .map(|course| {
            let conflict = Conflict::from(course);
            tracing::debug!(
                candidate = ?candidate.course_id,
                course_id = ?conflict.course_id,
                time = %conflict.time_str,
                "time conflict"
            );
            conflict
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(value: serde_json::Value) -> Course {
        Course::from_json(&value)
    }

    fn check(candidate: &Course, enrolled: &[Course]) -> Vec<Conflict> {
        check_time_conflict(Some(candidate), Some(enrolled))
    }

    fn ids(conflicts: &[Conflict]) -> Vec<Option<Field>> {
        conflicts.iter().map(|c| c.course_id.clone()).collect()
    }

    #[test]
    fn overlapping_period_conflicts() {
        let candidate = course(json!({
            "courseId": 1, "startWeek": 1, "endWeek": 16,
            "sessions": [{ "weekday": "周一", "startPeriod": 1, "endPeriod": 2, "weekType": 0 }]
        }));
        let enrolled = vec![course(json!({
            "courseId": 2, "courseName": "线性代数", "startWeek": 1, "endWeek": 16,
            "sessions": [{ "weekday": 1, "startPeriod": 2, "endPeriod": 3, "weekType": 0 }]
        }))];

        let conflicts = check(&candidate, &enrolled);

        assert_eq!(
            conflicts,
            vec![Conflict {
                course_id: Some(Field::from(2)),
                course_name: Some(Field::from("线性代数")),
                time_str: "周一 2-3节".to_string(),
            }]
        );
    }

    #[test]
    fn missing_inputs_yield_nothing() {
        let candidate = Course::new(1, "A").with_session(Session::new(1, 1, 2));

        let enrolled = vec![candidate.clone()];

        assert!(check_time_conflict(None, Some(enrolled.as_slice())).is_empty());
        assert!(check_time_conflict(Some(&candidate), None).is_empty());
        assert!(check(&candidate, &[]).is_empty());
    }

    #[test]
    fn disjoint_week_ranges_never_conflict() {
        let candidate = Course::new(1, "A")
            .with_weeks(1, 8)
            .with_session(Session::new(2, 1, 4));
        let enrolled = vec![Course::new(2, "B")
            .with_weeks(9, 16)
            .with_session(Session::new(2, 1, 4))];

        assert!(check(&candidate, &enrolled).is_empty());
    }

    #[test]
    fn same_id_is_skipped() {
        let candidate = Course::new(5, "A").with_session(Session::new(3, 1, 2));
        let enrolled = vec![Course::new(5, "A again").with_session(Session::new(3, 1, 2))];

        assert!(check(&candidate, &enrolled).is_empty());
    }

    #[test]
    fn ids_compare_strictly() {
        let candidate = Course::new(5, "A").with_session(Session::new(3, 1, 2));
        let enrolled = vec![Course::new("5", "A as text").with_session(Session::new(3, 1, 2))];

        assert_eq!(check(&candidate, &enrolled).len(), 1);
    }

    #[test]
    fn odd_and_even_weeks_do_not_meet() {
        let candidate = Course::new(1, "A")
            .with_session(Session::new("周二", 3, 4).with_week_type(WeekType::Odd));
        let enrolled = vec![Course::new(2, "B")
            .with_session(Session::new("星期二", 3, 4).with_week_type(WeekType::Even))];

        assert!(check(&candidate, &enrolled).is_empty());
    }

    #[test]
    fn parity_needs_a_matching_week_in_the_shared_range() {
        // Only week 4 is shared, so an odd-only session never meets there.
        let candidate = Course::new(1, "A")
            .with_weeks(1, 4)
            .with_session(Session::new(4, 5, 6).with_week_type(WeekType::Odd));
        let enrolled = vec![Course::new(2, "B")
            .with_weeks(4, 10)
            .with_session(Session::new(4, 5, 6))];

        assert!(check(&candidate, &enrolled).is_empty());

        let odd_and_all = vec![Course::new(3, "C")
            .with_weeks(3, 10)
            .with_session(Session::new(4, 6, 7))];
        assert_eq!(check(&candidate, &odd_and_all).len(), 1);
    }

    #[test]
    fn unparseable_slots_are_ignored() {
        let candidate = course(json!({
            "courseId": 1,
            "sessions": [
                { "weekday": "Monday", "startPeriod": 1, "endPeriod": 2 },
                { "weekday": 2, "startPeriod": "", "endPeriod": 2 }
            ]
        }));
        let enrolled = vec![course(json!({
            "courseId": 2,
            "sessions": [
                { "weekday": "Monday", "startPeriod": 1, "endPeriod": 2 },
                { "weekday": 2, "startPeriod": 1, "endPeriod": 2 }
            ]
        }))];

        assert!(check(&candidate, &enrolled).is_empty());
    }

    #[test]
    fn courses_without_sessions_never_conflict() {
        let candidate = Course::new(1, "Seminar");
        let enrolled = vec![Course::new(2, "B").with_session(Session::new(1, 1, 12))];

        assert!(check(&candidate, &enrolled).is_empty());
    }

    #[test]
    fn conflicts_keep_input_order() {
        let candidate = Course::new(1, "A")
            .with_session(Session::new(1, 1, 4))
            .with_session(Session::new(3, 5, 6));
        let enrolled = vec![
            Course::new(9, "late").with_session(Session::new("周三", 6, 7)),
            Course::new(2, "free").with_session(Session::new(2, 1, 4)),
            Course::new(4, "early")
                .with_session(Session::new(1, 4, 5).with_week_type(WeekType::Even))
                .with_session(Session::new(5, 1, 2)),
        ];

        let conflicts = check(&candidate, &enrolled);

        assert_eq!(ids(&conflicts), vec![Some(Field::from(9)), Some(Field::from(4))]);
        assert_eq!(conflicts[1].time_str, "周一 4-5节(双), 周五 1-2节");
    }

    #[test]
    fn huge_week_ranges_answer_immediately() {
        let candidate = course(json!({
            "courseId": 1, "startWeek": 1, "endWeek": 1e18,
            "sessions": [{ "weekday": 1, "startPeriod": 1, "endPeriod": 2, "weekType": 1 }]
        }));
        let even = vec![course(json!({
            "courseId": 2, "startWeek": 1, "endWeek": 4e9,
            "sessions": [{ "weekday": "周一", "startPeriod": 1, "endPeriod": 2, "weekType": 2 }]
        }))];
        let every_week = vec![course(json!({
            "courseId": 3, "startWeek": 2, "endWeek": 1e18,
            "sessions": [{ "weekday": "周一", "startPeriod": 2, "endPeriod": 3 }]
        }))];

        assert!(check(&candidate, &even).is_empty());
        assert_eq!(check(&candidate, &every_week).len(), 1);
    }

    #[test]
    fn null_id_differs_from_missing_id() {
        let slot = json!([{ "weekday": 1, "startPeriod": 1, "endPeriod": 2 }]);
        let null_id = course(json!({ "courseId": null, "sessions": slot }));
        let no_id = course(json!({ "sessions": slot }));

        assert_eq!(check(&null_id, &[no_id.clone()]).len(), 1);
        assert_eq!(check(&no_id, &[null_id.clone()]).len(), 1);
        assert!(check(&null_id, &[null_id.clone()]).is_empty());
        assert!(check(&no_id, &[no_id.clone()]).is_empty());
    }

    #[test]
    fn week_parity_intersection() {
        assert!(weeks_intersect(1, 16, WeekType::All, WeekType::All));
        assert!(!weeks_intersect(1, 16, WeekType::Odd, WeekType::Even));
        assert!(weeks_intersect(2, 3, WeekType::Odd, WeekType::All));
        assert!(!weeks_intersect(2, 2, WeekType::All, WeekType::Odd));
        assert!(weeks_intersect(2, 2, WeekType::Even, WeekType::Even));
        assert!(weeks_intersect(3, 3, WeekType::Odd, WeekType::Odd));
        assert!(!weeks_intersect(3, 3, WeekType::Even, WeekType::All));
        assert!(!weeks_intersect(5, 4, WeekType::All, WeekType::All));
        assert!(weeks_intersect(1, i64::MAX, WeekType::Even, WeekType::Even));
    }
}
