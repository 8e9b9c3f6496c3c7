use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::MemberStore;
use crate::error::StoreError;
use crate::models::{Group, Member, NewMember};

/// 进程内存储，用于本地演示与测试
#[derive(Default)]
pub struct MemoryStore {
    groups: RwLock<Vec<Group>>,
    members: RwLock<Vec<Member>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(groups: Vec<Group>) -> Self {
        Self {
            groups: RwLock::new(groups),
            members: RwLock::default(),
        }
    }

    /// 直接写入一行，跳过插入接口（测试数据预置用）
    pub fn seed_member(&self, member: Member) {
        if let Ok(mut members) = self.members.write() {
            members.push(member);
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Rejected {
            status: 500,
            message: "memory store lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let groups = self.groups.read().map_err(|_| Self::poisoned())?;
        Ok(groups.clone())
    }

    async fn list_members(&self, join_group_name: bool) -> Result<Vec<Member>, StoreError> {
        let members = self.members.read().map_err(|_| Self::poisoned())?;
        if !join_group_name {
            return Ok(members.clone());
        }

        let groups = self.groups.read().map_err(|_| Self::poisoned())?;
        Ok(members
            .iter()
            .cloned()
            .map(|mut m| {
                m.group_name = m
                    .group_id
                    .as_ref()
                    .and_then(|id| groups.iter().find(|g| &g.id == id))
                    .map(|g| g.name.clone());
                m
            })
            .collect())
    }

    async fn insert_member(&self, record: &NewMember) -> Result<(), StoreError> {
        let member = Member {
            id: Uuid::new_v4().to_string(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            role: record.role.clone(),
            birth: record.birth.clone(),
            address: record.address.clone(),
            affiliation: record.affiliation.clone(),
            group_id: record.group_id.clone(),
            is_member: record.is_member,
            group_name: None,
            created_at: Some(Utc::now()),
        };

        self.members
            .write()
            .map_err(|_| Self::poisoned())?
            .push(member);
        Ok(())
    }
}
