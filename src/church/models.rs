use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::default_true;

/// Singleton row describing the congregation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChurchInfo {
    pub id: String,
    pub name: String,
    pub tagline: Option<String>,
    pub about: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Patch for the church info; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChurchInfoRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub about: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceTime {
    pub id: String,
    pub name: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i64,
    /// `HH:MM`
    pub time: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceTimeRequest {
    pub name: String,
    pub day_of_week: i64,
    pub time: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceTimeRequest {
    pub name: Option<String>,
    pub day_of_week: Option<i64>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i64>,
}
