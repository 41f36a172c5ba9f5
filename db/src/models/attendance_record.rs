use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use strum::Display;

/// Which kind of subject actor a record is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Display, serde::Serialize, serde::Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "faculty")]
    Faculty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Display, serde::Serialize, serde::Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "excused")]
    Excused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, serde::Serialize, serde::Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordedBy {
    #[sea_orm(string_value = "nfc")]
    Nfc,
    #[sea_orm(string_value = "faculty")]
    Faculty,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "system")]
    System,
}

/// One attendance fact: a subject actor, a session, a calendar day.
///
/// `date` is the day in the institution's timezone and takes part in the
/// unique key; `captured_at` keeps the actual instant of capture.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub record_type: RecordType,
    pub subject_actor_id: i64,
    pub schedule_id: i64,
    pub date: NaiveDate,
    pub captured_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub recorded_by: RecordedBy,
    pub device_id: Option<i64>,
    pub recording_actor_id: Option<i64>,
    pub notes: Option<String>,
    pub is_manual_correction: bool,
    pub corrected_by: Option<i64>,
    pub corrected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::schedule::Column::Id"
    )]
    Schedule,
    #[sea_orm(
        belongs_to = "super::nfc_device::Entity",
        from = "Column::DeviceId",
        to = "super::nfc_device::Column::Id"
    )]
    Device,
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::nfc_device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The record matching the ledger's unique key, if any.
    pub async fn find_for_day(
        db: &DatabaseConnection,
        record_type: RecordType,
        subject_actor_id: i64,
        schedule_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::RecordType.eq(record_type))
            .filter(Column::SubjectActorId.eq(subject_actor_id))
            .filter(Column::ScheduleId.eq(schedule_id))
            .filter(Column::Date.eq(date))
            .one(db)
            .await
    }

    /// All student-type records in the inclusive date range, the working set
    /// for every report.
    pub async fn student_records_in_range(
        db: &DatabaseConnection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::RecordType.eq(RecordType::Student))
            .filter(Column::Date.gte(start))
            .filter(Column::Date.lte(end))
            .all(db)
            .await
    }
}
