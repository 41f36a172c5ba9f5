//! Attendance report aggregation.
//!
//! All four report shapes share one computational core, [`aggregate_rates`]:
//! they differ only in the grouping key and which display fields get joined
//! onto the buckets afterwards. Rate is (present + late) / total * 100,
//! rounded to two decimals, with an empty group rating 0 rather than NaN.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::models::{
    attendance_record::{self, AttendanceStatus},
    department, faculty_member, schedule, section, student, subject,
};

/// Inclusive calendar-day range, in the institution's timezone.
#[derive(Debug, Clone, Copy)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Counts and derived rate for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateBucket<K> {
    pub key: K,
    pub total: u64,
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    pub excused: u64,
    pub rate: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Folds (group key, status) pairs into per-group counts and rates.
pub fn aggregate_rates<K, I>(items: I) -> Vec<RateBucket<K>>
where
    K: Eq + std::hash::Hash,
    I: IntoIterator<Item = (K, AttendanceStatus)>,
{
    let mut groups: HashMap<K, (u64, u64, u64, u64)> = HashMap::new();
    for (key, status) in items {
        let counts = groups.entry(key).or_default();
        counts.0 += 1;
        match status {
            AttendanceStatus::Present => counts.1 += 1,
            AttendanceStatus::Absent => counts.2 += 1,
            AttendanceStatus::Late => counts.3 += 1,
            AttendanceStatus::Excused => {}
        }
    }

    groups
        .into_iter()
        .map(|(key, (total, present, absent, late))| {
            let rate = if total == 0 {
                0.0
            } else {
                round2((present + late) as f64 / total as f64 * 100.0)
            };
            RateBucket {
                key,
                total,
                present,
                absent,
                late,
                excused: total - present - absent - late,
                rate,
            }
        })
        .collect()
}

fn sort_rate_desc<R>(rows: &mut [R], rate_of: impl Fn(&R) -> f64) {
    rows.sort_by(|a, b| {
        rate_of(b)
            .partial_cmp(&rate_of(a))
            .unwrap_or(Ordering::Equal)
    });
}

// --- batched display-field joins ---

async fn schedules_by_id(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> Result<HashMap<i64, schedule::Model>, DbErr> {
    Ok(schedule::Entity::find()
        .filter(schedule::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn sections_by_id(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> Result<HashMap<i64, section::Model>, DbErr> {
    Ok(section::Entity::find()
        .filter(section::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn subjects_by_id(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> Result<HashMap<i64, subject::Model>, DbErr> {
    Ok(subject::Entity::find()
        .filter(subject::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn departments_by_id(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> Result<HashMap<i64, department::Model>, DbErr> {
    Ok(department::Entity::find()
        .filter(department::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn students_by_id(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> Result<HashMap<i64, student::Model>, DbErr> {
    Ok(student::Entity::find()
        .filter(student::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn faculty_by_id(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> Result<HashMap<i64, faculty_member::Model>, DbErr> {
    Ok(faculty_member::Entity::find()
        .filter(faculty_member::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

/// The joined working set every report starts from: student-type records in
/// range plus their schedules and sections.
async fn load_working_set(
    db: &DatabaseConnection,
    range: ReportRange,
) -> Result<
    (
        Vec<attendance_record::Model>,
        HashMap<i64, schedule::Model>,
        HashMap<i64, section::Model>,
    ),
    DbErr,
> {
    let records =
        attendance_record::Model::student_records_in_range(db, range.start, range.end).await?;
    let schedule_ids: Vec<i64> = records
        .iter()
        .map(|r| r.schedule_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let schedules = schedules_by_id(db, schedule_ids).await?;
    let section_ids: Vec<i64> = schedules
        .values()
        .map(|s| s.section_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let sections = sections_by_id(db, section_ids).await?;
    Ok((records, schedules, sections))
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendanceRow {
    pub student_id: i64,
    pub student_number: String,
    pub student_name: String,
    pub total_sessions: u64,
    pub present_sessions: u64,
    pub absent_sessions: u64,
    pub late_sessions: u64,
    pub attendance_rate: f64,
}

/// Per-student attendance percentage, optionally filtered by department or
/// section, sorted by rate descending.
pub async fn student_attendance_percentage(
    db: &DatabaseConnection,
    range: ReportRange,
    department_id: Option<i64>,
    section_id: Option<i64>,
) -> Result<Vec<StudentAttendanceRow>, DbErr> {
    let (records, schedules, sections) = load_working_set(db, range).await?;

    let pairs = records.iter().filter_map(|r| {
        let sched = schedules.get(&r.schedule_id)?;
        if let Some(section_id) = section_id {
            if sched.section_id != section_id {
                return None;
            }
        }
        if let Some(department_id) = department_id {
            let sec = sections.get(&sched.section_id)?;
            if sec.department_id != department_id {
                return None;
            }
        }
        Some((r.subject_actor_id, r.status))
    });

    let buckets = aggregate_rates(pairs);
    let students = students_by_id(db, buckets.iter().map(|b| b.key).collect()).await?;

    let mut rows: Vec<StudentAttendanceRow> = buckets
        .into_iter()
        .filter_map(|b| {
            let s = students.get(&b.key)?;
            Some(StudentAttendanceRow {
                student_id: s.id,
                student_number: s.student_number.clone(),
                student_name: s.full_name.clone(),
                total_sessions: b.total,
                present_sessions: b.present,
                absent_sessions: b.absent,
                late_sessions: b.late,
                attendance_rate: b.rate,
            })
        })
        .collect();
    sort_rate_desc(&mut rows, |r| r.attendance_rate);
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectAbsenceRow {
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub faculty_name: String,
    pub total_sessions: u64,
    pub present_sessions: u64,
    pub absent_sessions: u64,
    pub late_sessions: u64,
    pub absence_rate: f64,
    pub attendance_rate: f64,
}

/// Subjects ranked by absence rate descending, capped to `limit`.
pub async fn highest_absence_subjects(
    db: &DatabaseConnection,
    range: ReportRange,
    limit: usize,
) -> Result<Vec<SubjectAbsenceRow>, DbErr> {
    let (records, schedules, _) = load_working_set(db, range).await?;

    let pairs = records.iter().filter_map(|r| {
        let sched = schedules.get(&r.schedule_id)?;
        Some((sched.subject_id, r.status))
    });
    let buckets = aggregate_rates(pairs);

    let subjects = subjects_by_id(db, buckets.iter().map(|b| b.key).collect()).await?;
    // label each subject with the faculty of its lowest-id schedule, so the
    // label is stable when a subject has several schedules
    let mut faculty_of_subject: HashMap<i64, (i64, i64)> = HashMap::new();
    for s in schedules.values() {
        let entry = faculty_of_subject
            .entry(s.subject_id)
            .or_insert((s.id, s.faculty_id));
        if s.id < entry.0 {
            *entry = (s.id, s.faculty_id);
        }
    }
    let faculty =
        faculty_by_id(db, faculty_of_subject.values().map(|(_, fid)| *fid).collect()).await?;

    let mut rows: Vec<SubjectAbsenceRow> = buckets
        .into_iter()
        .filter_map(|b| {
            let subj = subjects.get(&b.key)?;
            let faculty_name = faculty_of_subject
                .get(&b.key)
                .and_then(|(_, fid)| faculty.get(fid))
                .map(|f| f.full_name.clone())
                .unwrap_or_default();
            let absence_rate = if b.total == 0 {
                0.0
            } else {
                round2(b.absent as f64 / b.total as f64 * 100.0)
            };
            Some(SubjectAbsenceRow {
                subject_id: subj.id,
                subject_name: subj.name.clone(),
                subject_code: subj.code.clone(),
                faculty_name,
                total_sessions: b.total,
                present_sessions: b.present,
                absent_sessions: b.absent,
                late_sessions: b.late,
                absence_rate,
                attendance_rate: b.rate,
            })
        })
        .collect();
    sort_rate_desc(&mut rows, |r| r.absence_rate);
    rows.truncate(limit);
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct FacultySectionRow {
    pub faculty_id: i64,
    pub section_id: i64,
    pub faculty_name: String,
    pub section_name: String,
    pub total_sessions: u64,
    pub present_sessions: u64,
    pub absent_sessions: u64,
    pub late_sessions: u64,
    pub attendance_rate: f64,
}

/// Attendance of each (faculty, section) pair's sessions, sorted by faculty
/// name then section name.
pub async fn faculty_attendance_by_section(
    db: &DatabaseConnection,
    range: ReportRange,
    faculty_id: Option<i64>,
    section_id: Option<i64>,
) -> Result<Vec<FacultySectionRow>, DbErr> {
    let (records, schedules, sections) = load_working_set(db, range).await?;

    let pairs = records.iter().filter_map(|r| {
        let sched = schedules.get(&r.schedule_id)?;
        if let Some(faculty_id) = faculty_id {
            if sched.faculty_id != faculty_id {
                return None;
            }
        }
        if let Some(section_id) = section_id {
            if sched.section_id != section_id {
                return None;
            }
        }
        Some(((sched.faculty_id, sched.section_id), r.status))
    });
    let buckets = aggregate_rates(pairs);

    let faculty =
        faculty_by_id(db, buckets.iter().map(|b| b.key.0).collect()).await?;

    let mut rows: Vec<FacultySectionRow> = buckets
        .into_iter()
        .filter_map(|b| {
            let (fid, sid) = b.key;
            let f = faculty.get(&fid)?;
            let sec = sections.get(&sid)?;
            Some(FacultySectionRow {
                faculty_id: fid,
                section_id: sid,
                faculty_name: f.full_name.clone(),
                section_name: sec.name.clone(),
                total_sessions: b.total,
                present_sessions: b.present,
                absent_sessions: b.absent,
                late_sessions: b.late,
                attendance_rate: b.rate,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.faculty_name
            .cmp(&b.faculty_name)
            .then_with(|| a.section_name.cmp(&b.section_name))
    });
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentComparisonRow {
    pub department_id: i64,
    pub department_name: String,
    pub department_code: String,
    pub total_sessions: u64,
    pub present_sessions: u64,
    pub absent_sessions: u64,
    pub late_sessions: u64,
    pub distinct_students: u64,
    pub attendance_rate: f64,
}

/// Departments compared by attendance rate, descending.
pub async fn department_attendance_comparison(
    db: &DatabaseConnection,
    range: ReportRange,
) -> Result<Vec<DepartmentComparisonRow>, DbErr> {
    let (records, schedules, sections) = load_working_set(db, range).await?;

    let dept_of_record = |r: &attendance_record::Model| -> Option<i64> {
        let sched = schedules.get(&r.schedule_id)?;
        Some(sections.get(&sched.section_id)?.department_id)
    };

    let pairs = records
        .iter()
        .filter_map(|r| Some((dept_of_record(r)?, r.status)));
    let buckets = aggregate_rates(pairs);

    let mut students_per_dept: HashMap<i64, HashSet<i64>> = HashMap::new();
    for r in &records {
        if let Some(dept_id) = dept_of_record(r) {
            students_per_dept
                .entry(dept_id)
                .or_default()
                .insert(r.subject_actor_id);
        }
    }

    let departments =
        departments_by_id(db, buckets.iter().map(|b| b.key).collect()).await?;

    let mut rows: Vec<DepartmentComparisonRow> = buckets
        .into_iter()
        .filter_map(|b| {
            let d = departments.get(&b.key)?;
            Some(DepartmentComparisonRow {
                department_id: d.id,
                department_name: d.name.clone(),
                department_code: d.code.clone(),
                total_sessions: b.total,
                present_sessions: b.present,
                absent_sessions: b.absent,
                late_sessions: b.late,
                distinct_students: students_per_dept
                    .get(&b.key)
                    .map(|s| s.len() as u64)
                    .unwrap_or(0),
                attendance_rate: b.rate,
            })
        })
        .collect();
    sort_rate_desc(&mut rows, |r| r.attendance_rate);
    Ok(rows)
}
