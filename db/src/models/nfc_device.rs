use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Set};
use thiserror::Error;

/// Registration pattern for human-readable device ids, e.g. `NFC-001` or
/// `LAB-A12`.
static DEVICE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{3,10}-[A-Z0-9]{3,10}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, serde::Serialize, serde::Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[sea_orm(string_value = "main_gate")]
    MainGate,
    #[sea_orm(string_value = "college_gate")]
    CollegeGate,
    #[sea_orm(string_value = "classroom")]
    Classroom,
    #[sea_orm(string_value = "lab")]
    Lab,
    #[sea_orm(string_value = "library")]
    Library,
    #[sea_orm(string_value = "auditorium")]
    Auditorium,
}

/// A registered NFC reader allowed to act as a recording actor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "nfc_devices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub device_id: String,
    pub name: String,
    pub location: Location,
    pub assigned_college_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
    /// Opaque credential presented by the device on every request.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_key_expires: DateTime<Utc>,
    pub is_active: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub registered_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::RegisteredBy",
        to = "super::admin::Column::Id"
    )]
    RegisteredByAdmin,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::AssignedDepartmentId",
        to = "super::department::Column::Id"
    )]
    AssignedDepartment,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RegisteredByAdmin.def()
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

/// Why a device was rejected. Collapsed to one generic "device rejected"
/// signal at the HTTP boundary so callers cannot probe which check failed.
#[derive(Debug, Error)]
pub enum DeviceAuthError {
    #[error("device not found")]
    NotFound,
    #[error("device is deactivated")]
    Inactive,
    #[error("device credential expired")]
    CredentialExpired,
    #[error("device credential mismatch")]
    CredentialMismatch,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Model {
    /// Registers a new device, minting its API key and expiry.
    #[allow(clippy::too_many_arguments)]
    pub async fn register(
        db: &DatabaseConnection,
        device_id: &str,
        name: &str,
        location: Location,
        assigned_college_id: Option<i64>,
        assigned_department_id: Option<i64>,
        registered_by: i64,
        key_validity_days: i64,
    ) -> Result<Self, DbErr> {
        let device_id = device_id.trim().to_uppercase();
        if !DEVICE_ID_PATTERN.is_match(&device_id) {
            return Err(DbErr::Custom(
                "Invalid device id format (expected e.g. NFC-001 or LAB-A12)".into(),
            ));
        }

        // A department-scoped device must point at an active department.
        if let Some(dept_id) = assigned_department_id {
            let dept = super::department::Entity::find_by_id(dept_id).one(db).await?;
            match dept {
                Some(d) if d.is_active => {}
                _ => {
                    return Err(DbErr::Custom(
                        "Assigned department not found or inactive".into(),
                    ));
                }
            }
        }

        let now = Utc::now();
        ActiveModel {
            device_id: Set(device_id),
            name: Set(name.to_owned()),
            location: Set(location),
            assigned_college_id: Set(assigned_college_id),
            assigned_department_id: Set(assigned_department_id),
            api_key: Set(mint_api_key()),
            api_key_expires: Set(now + Duration::days(key_validity_days)),
            is_active: Set(true),
            last_activity_at: Set(None),
            registered_by: Set(registered_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_device_id(
        db: &DatabaseConnection,
        device_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::DeviceId.eq(device_id.trim().to_uppercase()))
            .one(db)
            .await
    }

    /// Authenticates a device by id and API key.
    ///
    /// Returns the device only if it is active and the presented key matches
    /// and has not expired. On success the device's `last_activity_at` is
    /// updated best-effort; a failure there is logged and never surfaces.
    pub async fn authenticate(
        db: &DatabaseConnection,
        device_id: &str,
        api_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DeviceAuthError> {
        let device = Self::find_by_device_id(db, device_id)
            .await?
            .ok_or(DeviceAuthError::NotFound)?;

        if !device.is_active {
            return Err(DeviceAuthError::Inactive);
        }
        if device.api_key_expires <= now {
            return Err(DeviceAuthError::CredentialExpired);
        }
        if device.api_key != api_key {
            return Err(DeviceAuthError::CredentialMismatch);
        }

        if let Err(e) = device.clone().touch_activity(db, now).await {
            tracing::warn!(
                device_id = %device.device_id,
                error = %e,
                "failed to update device last_activity_at"
            );
        }

        Ok(device)
    }

    /// Updates `last_activity_at` to the given instant.
    pub async fn touch_activity(
        self,
        db: &DatabaseConnection,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.into();
        active.last_activity_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(db).await
    }

    /// Mints a fresh API key and expiry, invalidating the old credential.
    pub async fn rotate_key(
        self,
        db: &DatabaseConnection,
        key_validity_days: i64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let mut active: ActiveModel = self.into();
        active.api_key = Set(mint_api_key());
        active.api_key_expires = Set(now + Duration::days(key_validity_days));
        active.updated_at = Set(now);
        active.update(db).await
    }

    /// Retires a device. Devices are never deleted so their recordings keep a
    /// valid reference.
    pub async fn deactivate(self, db: &DatabaseConnection) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }
}

fn mint_api_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
