use serde::{Deserialize, Serialize};

use crate::crm::FieldInput;

/// 一次输入事件：字段名与输入框当前的完整值
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    pub value: FieldInput,
}
