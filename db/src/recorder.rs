//! The attendance recorder: validates and creates ledger entries, and the
//! explicit correction path for after-the-fact fixes.
//!
//! The duplicate pre-check here exists for error quality only; the unique
//! index on (record_type, subject_actor_id, schedule_id, date) is the
//! authoritative guard, and a racing insert's unique violation is remapped to
//! `DuplicateAttendance`.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use thiserror::Error;

use crate::models::{
    actor::{Actor, ActorKind},
    attendance_record::{self, ActiveModel, AttendanceStatus, RecordType, RecordedBy},
    enrollment, nfc_device, schedule,
};

pub const MAX_NOTES_LEN: usize = 500;

/// Who is causing a record to be created.
#[derive(Debug, Clone, Copy)]
pub enum RecordingActor<'a> {
    Device(&'a nfc_device::Model),
    Staff(StaffActor),
}

#[derive(Debug, Clone, Copy)]
pub struct StaffActor {
    pub id: i64,
    pub kind: ActorKind,
}

/// Client-correctable failures of the recording and correction paths. Each
/// carries a stable machine-readable kind for the HTTP boundary.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("session not found")]
    SessionNotFound,
    #[error("session is not active")]
    SessionInactive,
    #[error("student is not enrolled in this subject")]
    NotEnrolled,
    #[error("actor not authorized for this session")]
    NotAuthorizedForSession,
    #[error("capture time is in the future")]
    FutureCapture,
    #[error("attendance already recorded for this day")]
    DuplicateAttendance,
    #[error("attendance record not found")]
    RecordNotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl RecordError {
    /// Stable machine-readable kind, part of the API contract.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::SessionNotFound => "session_not_found",
            RecordError::SessionInactive => "session_inactive",
            RecordError::NotEnrolled => "not_enrolled",
            RecordError::NotAuthorizedForSession => "not_authorized_for_session",
            RecordError::FutureCapture => "future_capture",
            RecordError::DuplicateAttendance => "duplicate_attendance",
            RecordError::RecordNotFound => "record_not_found",
            RecordError::Validation(_) => "validation_error",
            RecordError::Db(_) => "internal_error",
        }
    }
}

/// Parameters for [`record_attendance`].
#[derive(Debug, Clone)]
pub struct RecordAttendance<'a> {
    pub actor: RecordingActor<'a>,
    pub subject_actor: &'a Actor,
    pub schedule_id: i64,
    pub captured_at: DateTime<Utc>,
    /// Only staff actors may set this; a device scan always means present.
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    /// Institution timezone as minutes east of UTC; decides which calendar
    /// day `captured_at` falls on.
    pub tz_offset_minutes: i32,
}

/// The calendar day an instant falls on in the institution's timezone.
pub fn local_day(at: DateTime<Utc>, tz_offset_minutes: i32) -> Result<NaiveDate, RecordError> {
    let offset = FixedOffset::east_opt(tz_offset_minutes * 60)
        .ok_or_else(|| RecordError::Validation("Invalid timezone offset".into()))?;
    Ok(at.with_timezone(&offset).date_naive())
}

/// Validates and writes one attendance record.
pub async fn record_attendance(
    db: &DatabaseConnection,
    params: RecordAttendance<'_>,
) -> Result<attendance_record::Model, RecordError> {
    let session = schedule::Entity::find_by_id(params.schedule_id)
        .one(db)
        .await?
        .ok_or(RecordError::SessionNotFound)?;
    if !session.is_active {
        return Err(RecordError::SessionInactive);
    }

    if !params.subject_actor.is_active {
        return Err(RecordError::NotAuthorizedForSession);
    }

    let record_type = match params.subject_actor.kind {
        ActorKind::Student => RecordType::Student,
        ActorKind::Faculty => RecordType::Faculty,
        ActorKind::Admin => {
            return Err(RecordError::Validation(
                "Attendance can only be recorded for students or faculty".into(),
            ));
        }
    };

    match record_type {
        RecordType::Student => {
            let enrolled = enrollment::Model::exists_for_term(
                db,
                params.subject_actor.id,
                session.subject_id,
                &session.academic_year,
                session.semester,
            )
            .await?;
            if !enrolled {
                return Err(RecordError::NotEnrolled);
            }
        }
        RecordType::Faculty => {
            // The assigned faculty member, or an admin overriding manually.
            let admin_override = matches!(
                params.actor,
                RecordingActor::Staff(StaffActor {
                    kind: ActorKind::Admin,
                    ..
                })
            );
            if session.faculty_id != params.subject_actor.id && !admin_override {
                return Err(RecordError::NotAuthorizedForSession);
            }
        }
    }

    let now = Utc::now();
    if params.captured_at > now {
        return Err(RecordError::FutureCapture);
    }
    let date = local_day(params.captured_at, params.tz_offset_minutes)?;

    if let Some(notes) = &params.notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(RecordError::Validation(format!(
                "Notes may not exceed {MAX_NOTES_LEN} characters"
            )));
        }
    }

    let (status, recorded_by, device_id, recording_actor_id) = match params.actor {
        RecordingActor::Device(device) => {
            // Device scans always mean "present"; any supplied status is
            // ignored rather than trusted.
            (AttendanceStatus::Present, RecordedBy::Nfc, Some(device.id), None)
        }
        RecordingActor::Staff(staff) => {
            let recorded_by = match staff.kind {
                ActorKind::Admin => RecordedBy::Admin,
                ActorKind::Faculty => RecordedBy::Faculty,
                ActorKind::Student => {
                    return Err(RecordError::NotAuthorizedForSession);
                }
            };
            (
                params.status.unwrap_or(AttendanceStatus::Present),
                recorded_by,
                None,
                Some(staff.id),
            )
        }
    };

    // Advisory duplicate pre-check for a precise error message.
    if attendance_record::Model::find_for_day(
        db,
        record_type,
        params.subject_actor.id,
        params.schedule_id,
        date,
    )
    .await?
    .is_some()
    {
        return Err(RecordError::DuplicateAttendance);
    }

    persist_record(
        db,
        ActiveModel {
            record_type: Set(record_type),
            subject_actor_id: Set(params.subject_actor.id),
            schedule_id: Set(params.schedule_id),
            date: Set(date),
            captured_at: Set(params.captured_at),
            status: Set(status),
            recorded_by: Set(recorded_by),
            device_id: Set(device_id),
            recording_actor_id: Set(recording_actor_id),
            notes: Set(params.notes.clone()),
            is_manual_correction: Set(false),
            corrected_by: Set(None),
            corrected_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        },
    )
    .await
}

/// Inserts the row, treating a unique-index violation as a duplicate. This is
/// the authoritative guard; a concurrent insert that won the race between the
/// pre-check and this insert surfaces as `DuplicateAttendance`, not a 500.
async fn persist_record(
    db: &DatabaseConnection,
    row: ActiveModel,
) -> Result<attendance_record::Model, RecordError> {
    match row.insert(db).await {
        Ok(record) => Ok(record),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(RecordError::DuplicateAttendance)
        }
        Err(e) => Err(RecordError::Db(e)),
    }
}

/// Applies a manual correction to an existing record.
///
/// Only the session's assigned faculty member or an admin may correct. The
/// original `recorded_by`/`device_id` are preserved; the record is flagged as
/// a manual correction and the audit pair records who corrected it and when.
pub async fn correct_record(
    db: &DatabaseConnection,
    record_id: i64,
    new_status: AttendanceStatus,
    notes: Option<String>,
    correcting_actor: StaffActor,
) -> Result<attendance_record::Model, RecordError> {
    let record = attendance_record::Entity::find_by_id(record_id)
        .one(db)
        .await?
        .ok_or(RecordError::RecordNotFound)?;

    let session = schedule::Entity::find_by_id(record.schedule_id)
        .one(db)
        .await?
        .ok_or(RecordError::SessionNotFound)?;

    let authorized = match correcting_actor.kind {
        ActorKind::Admin => true,
        ActorKind::Faculty => session.faculty_id == correcting_actor.id,
        ActorKind::Student => false,
    };
    if !authorized {
        return Err(RecordError::NotAuthorizedForSession);
    }

    if let Some(notes) = &notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(RecordError::Validation(format!(
                "Notes may not exceed {MAX_NOTES_LEN} characters"
            )));
        }
    }

    let now = Utc::now();
    let mut active: ActiveModel = record.into();
    active.status = Set(new_status);
    if let Some(notes) = notes {
        active.notes = Set(Some(notes));
    }
    active.is_manual_correction = Set(true);
    active.corrected_by = Set(Some(correcting_actor.id));
    active.corrected_at = Set(Some(now));
    active.updated_at = Set(now);

    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::nfc_device::Location;
    use crate::test_utils::{seed_directory, setup_test_db};
    use chrono::Duration;

    async fn student_actor(db: &DatabaseConnection, id: i64) -> Actor {
        Actor::find(db, ActorKind::Student, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn device_scan_records_present() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "a").await;
        enrollment::Model::create(&db, dir.student.id, dir.subject.id, "2025-2026", 1)
            .await
            .unwrap();
        let device = nfc_device::Model::register(
            &db,
            "NFC-001",
            "Gate",
            Location::MainGate,
            None,
            None,
            dir.admin.id,
            365,
        )
        .await
        .unwrap();

        let actor = student_actor(&db, dir.student.id).await;
        let record = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Device(&device),
                subject_actor: &actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                // devices cannot set a status; this must be ignored
                status: Some(AttendanceStatus::Late),
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap();

        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.recorded_by, RecordedBy::Nfc);
        assert_eq!(record.device_id, Some(device.id));
        assert_eq!(record.recording_actor_id, None);
        assert!(!record.is_manual_correction);
    }

    #[tokio::test]
    async fn duplicate_same_day_is_rejected() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "b").await;
        enrollment::Model::create(&db, dir.student.id, dir.subject.id, "2025-2026", 1)
            .await
            .unwrap();
        let actor = student_actor(&db, dir.student.id).await;
        let staff = StaffActor {
            id: dir.faculty.id,
            kind: ActorKind::Faculty,
        };

        let params = RecordAttendance {
            actor: RecordingActor::Staff(staff),
            subject_actor: &actor,
            schedule_id: dir.schedule.id,
            captured_at: Utc::now(),
            status: None,
            notes: None,
            tz_offset_minutes: 180,
        };

        record_attendance(&db, params.clone()).await.unwrap();
        let err = record_attendance(&db, params).await.unwrap_err();
        assert!(matches!(err, RecordError::DuplicateAttendance));
        assert_eq!(err.kind(), "duplicate_attendance");
    }

    #[tokio::test]
    async fn unique_index_catches_insert_that_beat_the_precheck() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "u").await;
        let now = Utc::now();
        let date = local_day(now, 180).unwrap();

        // Two identical rows straight at the insert path, as if both passed
        // the advisory pre-check before either row existed.
        let row = || ActiveModel {
            record_type: Set(RecordType::Student),
            subject_actor_id: Set(dir.student.id),
            schedule_id: Set(dir.schedule.id),
            date: Set(date),
            captured_at: Set(now),
            status: Set(AttendanceStatus::Present),
            recorded_by: Set(RecordedBy::Nfc),
            device_id: Set(None),
            recording_actor_id: Set(None),
            notes: Set(None),
            is_manual_correction: Set(false),
            corrected_by: Set(None),
            corrected_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        persist_record(&db, row()).await.unwrap();
        let err = persist_record(&db, row()).await.unwrap_err();
        assert!(matches!(err, RecordError::DuplicateAttendance));
        assert_eq!(err.kind(), "duplicate_attendance");
    }

    #[tokio::test]
    async fn future_capture_is_rejected() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "c").await;
        enrollment::Model::create(&db, dir.student.id, dir.subject.id, "2025-2026", 1)
            .await
            .unwrap();
        let actor = student_actor(&db, dir.student.id).await;

        let err = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Staff(StaffActor {
                    id: dir.faculty.id,
                    kind: ActorKind::Faculty,
                }),
                subject_actor: &actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now() + Duration::hours(1),
                status: None,
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordError::FutureCapture));
    }

    #[tokio::test]
    async fn unenrolled_student_is_rejected() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "d").await;
        // no enrollment seeded
        let actor = student_actor(&db, dir.student.id).await;

        let err = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Staff(StaffActor {
                    id: dir.faculty.id,
                    kind: ActorKind::Faculty,
                }),
                subject_actor: &actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                status: None,
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordError::NotEnrolled));
    }

    #[tokio::test]
    async fn inactive_session_is_rejected() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "e").await;
        enrollment::Model::create(&db, dir.student.id, dir.subject.id, "2025-2026", 1)
            .await
            .unwrap();
        let actor = student_actor(&db, dir.student.id).await;
        dir.schedule.clone().deactivate(&db).await.unwrap();

        let err = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Staff(StaffActor {
                    id: dir.faculty.id,
                    kind: ActorKind::Faculty,
                }),
                subject_actor: &actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                status: None,
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordError::SessionInactive));
    }

    #[tokio::test]
    async fn faculty_subject_actor_must_be_assigned() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "f").await;
        let other = crate::models::faculty_member::Model::create(
            &db,
            dir.department.id,
            "Other Faculty",
            "other_faculty@test.edu",
            None,
            "password",
        )
        .await
        .unwrap();
        let other_actor = Actor::find(&db, ActorKind::Faculty, other.id)
            .await
            .unwrap()
            .unwrap();

        // recording the wrong faculty member as subject fails...
        let err = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Staff(StaffActor {
                    id: other.id,
                    kind: ActorKind::Faculty,
                }),
                subject_actor: &other_actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                status: None,
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordError::NotAuthorizedForSession));

        // ...unless an admin overrides.
        let record = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Staff(StaffActor {
                    id: dir.admin.id,
                    kind: ActorKind::Admin,
                }),
                subject_actor: &other_actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                status: Some(AttendanceStatus::Excused),
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap();
        assert_eq!(record.record_type, RecordType::Faculty);
        assert_eq!(record.status, AttendanceStatus::Excused);
        assert_eq!(record.recording_actor_id, Some(dir.admin.id));
    }

    #[tokio::test]
    async fn correction_keeps_provenance_and_audits() {
        let db = setup_test_db().await;
        let dir = seed_directory(&db, "g").await;
        enrollment::Model::create(&db, dir.student.id, dir.subject.id, "2025-2026", 1)
            .await
            .unwrap();
        let device = nfc_device::Model::register(
            &db,
            "NFC-007",
            "Class reader",
            Location::Classroom,
            None,
            Some(dir.department.id),
            dir.admin.id,
            365,
        )
        .await
        .unwrap();
        let actor = student_actor(&db, dir.student.id).await;

        let record = record_attendance(
            &db,
            RecordAttendance {
                actor: RecordingActor::Device(&device),
                subject_actor: &actor,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                status: None,
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap();

        // a student may not correct
        let err = correct_record(
            &db,
            record.id,
            AttendanceStatus::Excused,
            None,
            StaffActor {
                id: dir.student.id,
                kind: ActorKind::Student,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecordError::NotAuthorizedForSession));

        let corrected = correct_record(
            &db,
            record.id,
            AttendanceStatus::Excused,
            Some("Medical certificate".into()),
            StaffActor {
                id: dir.faculty.id,
                kind: ActorKind::Faculty,
            },
        )
        .await
        .unwrap();

        assert_eq!(corrected.status, AttendanceStatus::Excused);
        assert!(corrected.is_manual_correction);
        assert_eq!(corrected.corrected_by, Some(dir.faculty.id));
        assert!(corrected.corrected_at.is_some());
        // provenance of the original capture is preserved
        assert_eq!(corrected.recorded_by, RecordedBy::Nfc);
        assert_eq!(corrected.device_id, Some(device.id));
    }

    #[test]
    fn local_day_respects_offset() {
        use chrono::TimeZone;
        // 23:30 UTC on Jan 1 is already Jan 2 at UTC+3
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(
            local_day(at, 180).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
        );
        assert_eq!(
            local_day(at, 0).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }
}
