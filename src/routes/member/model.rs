use serde::Serialize;

use crate::crm::GroupCounts;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub counts: GroupCounts,
    pub total: usize,
}

impl From<GroupCounts> for StatsResponse {
    fn from(counts: GroupCounts) -> Self {
        let total = counts.total();
        Self { counts, total }
    }
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub groups: usize,
    pub members: usize,
}
