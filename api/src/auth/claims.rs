use db::models::actor::ActorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    pub role: ActorKind,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.0.role, ActorKind::Admin)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.0.role, ActorKind::Admin | ActorKind::Faculty)
    }
}
