use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 成员库中的一行，远端为准，本地只是缓存副本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Member {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub birth: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_opt_id")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub is_member: bool,
    /// 联表查询时附带的群组名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 插入请求体，id 与时间戳由存储端生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
    pub role: String,
    pub birth: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub is_member: bool,
}
