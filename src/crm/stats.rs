use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::models::{Group, Member};

/// 找不到对应群组时的统计标签
pub const UNKNOWN_GROUP_LABEL: &str = "(알 수 없음)";

/// 按哪个字段统计人数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// `group_id` 外键，按群组名统计
    #[default]
    GroupRef,
    /// 自由文本的 affiliation
    Affiliation,
}

/// 群组标签到人数的映射，保持首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCounts(Vec<(String, usize)>);

impl GroupCounts {
    fn bump(&mut self, label: &str) {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label.to_string(), 1)),
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, c)| *c)
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

impl Serialize for GroupCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

fn label_for<'a>(member: &'a Member, groups: &'a [Group], mode: GroupingMode) -> &'a str {
    match mode {
        GroupingMode::GroupRef => member
            .group_id
            .as_deref()
            .and_then(|id| groups.iter().find(|g| g.id == id))
            .map(|g| g.name.as_str())
            .or(member.group_name.as_deref())
            .unwrap_or(UNKNOWN_GROUP_LABEL),
        GroupingMode::Affiliation => member
            .affiliation
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_GROUP_LABEL),
    }
}

pub fn compute_group_counts(
    members: &[Member],
    groups: &[Group],
    mode: GroupingMode,
) -> GroupCounts {
    let mut counts = GroupCounts::default();
    for member in members {
        counts.bump(label_for(member, groups, mode));
    }
    counts
}
