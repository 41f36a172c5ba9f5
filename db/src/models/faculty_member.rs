use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Set};

/// Represents a teaching staff member in the `faculty_members` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "faculty_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub department_id: i64,
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
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::schedule::Entity")]
    Schedules,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        department_id: i64,
        full_name: &str,
        email: &str,
        card_id: Option<&str>,
        password: &str,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            department_id: Set(department_id),
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
