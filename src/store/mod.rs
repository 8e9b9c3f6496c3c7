//! 远端成员库的读写接口
//!
//! 控制器只依赖 [`MemberStore`]，具体后端在启动时按配置选择。

mod memory;
mod postgres;
mod supabase;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Group, Member, NewMember};

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;

    /// `join_group_name` 为真时附带解析出的群组名
    async fn list_members(&self, join_group_name: bool) -> Result<Vec<Member>, StoreError>;

    async fn insert_member(&self, record: &NewMember) -> Result<(), StoreError>;
}
