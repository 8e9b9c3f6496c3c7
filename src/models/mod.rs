mod group;
mod member;

pub use group::Group;
pub use member::{Member, NewMember};

use serde::{Deserialize, Deserializer, de::Error};
use serde_json::Value;

// Supabase 表的主键可能是 uuid 也可能是 bigint，统一转成字符串
fn id_from_value<E: Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(E::custom(format!("unexpected id value: {}", other))),
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)?
        .ok_or_else(|| D::Error::custom("id must not be null"))
}

pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)
}
