use db::models::nfc_device::{Location, Model as DeviceModel};
use serde::Serialize;

/// Serialized device, credential omitted. The API key is only ever shown in
/// the registration and rotation responses.
#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub id: i64,
    pub device_id: String,
    pub name: String,
    pub location: Location,
    pub assigned_college_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
    pub api_key_expires: String,
    pub is_active: bool,
    pub last_activity_at: Option<String>,
    pub registered_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DeviceModel> for DeviceResponse {
    fn from(device: DeviceModel) -> Self {
        Self {
            id: device.id,
            device_id: device.device_id,
            name: device.name,
            location: device.location,
            assigned_college_id: device.assigned_college_id,
            assigned_department_id: device.assigned_department_id,
            api_key_expires: device.api_key_expires.to_rfc3339(),
            is_active: device.is_active,
            last_activity_at: device.last_activity_at.map(|t| t.to_rfc3339()),
            registered_by: device.registered_by,
            created_at: device.created_at.to_rfc3339(),
            updated_at: device.updated_at.to_rfc3339(),
        }
    }
}

/// Registration and rotation responses carry the freshly minted key once.
#[derive(Debug, Serialize)]
pub struct DeviceWithKeyResponse {
    #[serde(flatten)]
    pub device: DeviceResponse,
    pub api_key: String,
}
