use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::format::{format_birth, format_phone};
use super::stats::GroupingMode;
use crate::models::NewMember;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Phone,
    Role,
    Birth,
    Address,
    Affiliation,
    GroupId,
    IsMember,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Phone => "phone",
            DraftField::Role => "role",
            DraftField::Birth => "birth",
            DraftField::Address => "address",
            DraftField::Affiliation => "affiliation",
            DraftField::GroupId => "group_id",
            DraftField::IsMember => "is_member",
        }
    }

    /// 表单上显示的标签
    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "이름",
            DraftField::Phone => "연락처",
            DraftField::Role => "역할",
            DraftField::Birth => "생년월일",
            DraftField::Address => "주소",
            DraftField::Affiliation => "소속",
            DraftField::GroupId => "소속 그룹",
            DraftField::IsMember => "권리당원 여부",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for DraftField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => DraftField::Name,
            "phone" => DraftField::Phone,
            "role" => DraftField::Role,
            "birth" => DraftField::Birth,
            "address" => DraftField::Address,
            "affiliation" => DraftField::Affiliation,
            "group_id" => DraftField::GroupId,
            "is_member" => DraftField::IsMember,
            other => return Err(UnknownField(other.to_string())),
        })
    }
}

/// 一次输入事件携带的值：文本框给字符串，复选框给勾选状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Checked(bool),
    Text(String),
}

impl FieldInput {
    fn into_text(self) -> String {
        match self {
            FieldInput::Text(s) => s,
            FieldInput::Checked(b) => b.to_string(),
        }
    }

    fn into_checked(self) -> bool {
        match self {
            FieldInput::Checked(b) => b,
            FieldInput::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "1" | "y" | "yes"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    #[default]
    Editing,
    /// 刚提交成功并已清空
    Submitted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub name: String,
    pub phone: String,
    pub role: String,
    pub birth: String,
    pub address: String,
    pub affiliation: String,
    pub group_id: String,
    pub is_member: bool,
}

impl MemberDraft {
    /// 写入前按字段做格式化，电话与生日以外原样保存
    pub fn apply(&mut self, field: DraftField, input: FieldInput) {
        let slot = match field {
            DraftField::IsMember => {
                self.is_member = input.into_checked();
                return;
            }
            DraftField::Name => &mut self.name,
            DraftField::Phone => &mut self.phone,
            DraftField::Role => &mut self.role,
            DraftField::Birth => &mut self.birth,
            DraftField::Address => &mut self.address,
            DraftField::Affiliation => &mut self.affiliation,
            DraftField::GroupId => &mut self.group_id,
        };

        let raw = input.into_text();
        *slot = match field {
            DraftField::Phone => format_phone(&raw),
            DraftField::Birth => format_birth(&raw),
            _ => raw,
        };
    }

    fn text(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Phone => &self.phone,
            DraftField::Role => &self.role,
            DraftField::Birth => &self.birth,
            DraftField::Address => &self.address,
            DraftField::Affiliation => &self.affiliation,
            DraftField::GroupId => &self.group_id,
            DraftField::IsMember => "",
        }
    }

    pub fn required_fields(mode: GroupingMode) -> [DraftField; 6] {
        [
            DraftField::Name,
            DraftField::Phone,
            DraftField::Role,
            DraftField::Birth,
            DraftField::Address,
            match mode {
                GroupingMode::GroupRef => DraftField::GroupId,
                GroupingMode::Affiliation => DraftField::Affiliation,
            },
        ]
    }

    /// 为空（去掉首尾空白后）的必填项，按表单顺序
    pub fn missing_fields(&self, mode: GroupingMode) -> Vec<DraftField> {
        Self::required_fields(mode)
            .into_iter()
            .filter(|f| self.text(*f).trim().is_empty())
            .collect()
    }

    pub fn to_record(&self, mode: GroupingMode, address_prefix: Option<&str>) -> NewMember {
        let address = match address_prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prefix) if !self.address.starts_with(prefix) => {
                format!("{} {}", prefix, self.address)
            }
            _ => self.address.clone(),
        };
        let non_empty = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());

        NewMember {
            name: self.name.clone(),
            phone: self.phone.clone(),
            role: self.role.clone(),
            birth: self.birth.clone(),
            address,
            affiliation: match mode {
                GroupingMode::Affiliation => non_empty(&self.affiliation),
                GroupingMode::GroupRef => None,
            },
            group_id: match mode {
                GroupingMode::GroupRef => non_empty(&self.group_id),
                GroupingMode::Affiliation => None,
            },
            is_member: self.is_member,
        }
    }
}
