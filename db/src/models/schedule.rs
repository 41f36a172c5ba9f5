use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

/// A scheduled session: a subject taught by a faculty member to a section in
/// a recurring time/room slot.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub faculty_id: i64,
    pub section_id: i64,
    pub classroom: String,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i32,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub academic_year: String,
    pub semester: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::faculty_member::Entity",
        from = "Column::FacultyId",
        to = "super::faculty_member::Column::Id"
    )]
    Faculty,
    #[sea_orm(
        belongs_to = "super::section::Entity",
        from = "Column::SectionId",
        to = "super::section::Column::Id"
    )]
    Section,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::faculty_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Faculty.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DatabaseConnection,
        subject_id: i64,
        faculty_id: i64,
        section_id: i64,
        classroom: &str,
        day_of_week: i32,
        starts_at: NaiveTime,
        ends_at: NaiveTime,
        academic_year: &str,
        semester: i32,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            subject_id: Set(subject_id),
            faculty_id: Set(faculty_id),
            section_id: Set(section_id),
            classroom: Set(classroom.to_owned()),
            day_of_week: Set(day_of_week),
            starts_at: Set(starts_at),
            ends_at: Set(ends_at),
            academic_year: Set(academic_year.to_owned()),
            semester: Set(semester),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn deactivate(self, db: &DatabaseConnection) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }
}
