use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 所属群组，只读参考数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    pub name: String,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
