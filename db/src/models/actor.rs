//! Unified lookup over the three stored user variants.
//!
//! Admins, faculty members and students live in separate tables, but the
//! attendance core only ever needs a small capability set from whoever it is
//! acting on or for. `Actor` carries that set so downstream code never
//! branches on role strings.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{admin, faculty_member, student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Admin,
    Faculty,
    Student,
}

/// Capability view of a stored user, independent of which table backs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: i64,
    pub display_name: String,
    pub is_active: bool,
    pub kind: ActorKind,
}

impl Actor {
    /// Looks up an actor by kind and id in the backing table.
    pub async fn find(
        db: &DatabaseConnection,
        kind: ActorKind,
        id: i64,
    ) -> Result<Option<Self>, DbErr> {
        let actor = match kind {
            ActorKind::Admin => admin::Entity::find_by_id(id).one(db).await?.map(|a| Actor {
                id: a.id,
                display_name: a.full_name,
                is_active: a.is_active,
                kind,
            }),
            ActorKind::Faculty => {
                faculty_member::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .map(|f| Actor {
                        id: f.id,
                        display_name: f.full_name,
                        is_active: f.is_active,
                        kind,
                    })
            }
            ActorKind::Student => student::Entity::find_by_id(id).one(db).await?.map(|s| Actor {
                id: s.id,
                display_name: s.full_name,
                is_active: s.is_active,
                kind,
            }),
        };
        Ok(actor)
    }

    /// Resolves an NFC card to its holder. Students are checked before
    /// faculty, matching how cards are issued.
    pub async fn find_by_card(
        db: &DatabaseConnection,
        card_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        if let Some(s) = student::Model::find_by_card(db, card_id).await? {
            return Ok(Some(Actor {
                id: s.id,
                display_name: s.full_name,
                is_active: s.is_active,
                kind: ActorKind::Student,
            }));
        }
        if let Some(f) = faculty_member::Model::find_by_card(db, card_id).await? {
            return Ok(Some(Actor {
                id: f.id,
                display_name: f.full_name,
                is_active: f.is_active,
                kind: ActorKind::Faculty,
            }));
        }
        Ok(None)
    }
}
