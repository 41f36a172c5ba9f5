use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Set};

/// Represents a student in the `students` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique student number as printed on the student card.
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    /// NFC card identifier used by gate/classroom readers, if issued.
    pub card_id: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        student_number: &str,
        full_name: &str,
        email: &str,
        card_id: Option<&str>,
        password: &str,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            student_number: Set(student_number.to_owned()),
            full_name: Set(full_name.to_owned()),
            email: Set(email.to_owned()),
            card_id: Set(card_id.map(|c| c.to_owned())),
            password_hash: Set(super::admin::hash_password(password)?),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_card(
        db: &DatabaseConnection,
        card_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::CardId.eq(card_id))
            .one(db)
            .await
    }
}
