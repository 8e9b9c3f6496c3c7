use async_trait::async_trait;
use sqlx::PgPool;

use super::MemberStore;
use crate::error::StoreError;
use crate::models::{Group, Member, NewMember};

/// 直连 Postgres（Supabase 底层即 Postgres）
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl MemberStore for PgStore {
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name
            FROM groups
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn list_members(&self, join_group_name: bool) -> Result<Vec<Member>, StoreError> {
        let sql = if join_group_name {
            r#"
            SELECT
                m.id, m.name, m.phone, m.role, m.birth, m.address,
                m.affiliation, m.group_id, m.is_member, m.created_at,
                g.name AS group_name
            FROM members m
            LEFT JOIN groups g ON g.id = m.group_id
            ORDER BY m.created_at, m.id
            "#
        } else {
            r#"
            SELECT
                id, name, phone, role, birth, address,
                affiliation, group_id, is_member, created_at
            FROM members
            ORDER BY created_at, id
            "#
        };

        let members = sqlx::query_as::<_, Member>(sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(members)
    }

    async fn insert_member(&self, record: &NewMember) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO members (
                name, phone, role, birth, address, affiliation, group_id, is_member
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.role)
        .bind(&record.birth)
        .bind(&record.address)
        .bind(&record.affiliation)
        .bind(&record.group_id)
        .bind(record.is_member)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Inserted member row for {}", record.name);
        Ok(())
    }
}
