use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Set};

/// Links a student to a subject for an academic term. The existence of a row
/// here is what authorizes attendance records for that student and subject.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub academic_year: String,
    pub semester: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        student_id: i64,
        subject_id: i64,
        academic_year: &str,
        semester: i32,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            student_id: Set(student_id),
            subject_id: Set(subject_id),
            academic_year: Set(academic_year.to_owned()),
            semester: Set(semester),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Whether the student holds an enrollment for this subject and term.
    pub async fn exists_for_term(
        db: &DatabaseConnection,
        student_id: i64,
        subject_id: i64,
        academic_year: &str,
        semester: i32,
    ) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::AcademicYear.eq(academic_year))
            .filter(Column::Semester.eq(semester))
            .one(db)
            .await?
            .is_some())
    }
}
