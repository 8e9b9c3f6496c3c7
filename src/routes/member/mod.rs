mod handler;
mod model;

pub use handler::{list_groups, list_members, member_stats, reload};
pub use model::{ReloadResponse, StatsResponse};
