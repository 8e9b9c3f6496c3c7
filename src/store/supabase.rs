use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::MemberStore;
use crate::error::StoreError;
use crate::models::{Group, Member, NewMember};

/// 通过 PostgREST 访问托管的 Supabase 项目
#[derive(Clone)]
pub struct SupabaseStore {
    http: Client,
    rest_url: String,
    api_key: String,
}

// `select=*,groups(name)` 时群组名嵌套在 groups 对象里
#[derive(Debug, Deserialize)]
struct MemberRow {
    #[serde(flatten)]
    member: Member,
    #[serde(default)]
    groups: Option<GroupNameRef>,
}

#[derive(Debug, Deserialize)]
struct GroupNameRef {
    name: Option<String>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        let mut member = row.member;
        if let Some(name) = row.groups.and_then(|g| g.name) {
            member.group_name = Some(name);
        }
        member
    }
}

impl SupabaseStore {
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), project_url, api_key)
    }

    pub fn with_client(http: Client, project_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = format!("{}/{}", self.rest_url, path);
        tracing::debug!("GET {}", url);

        let response = self.authorized(self.http.get(&url)).send().await?;
        let body = Self::check(response).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MemberStore for SupabaseStore {
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        self.fetch("groups?select=*").await
    }

    async fn list_members(&self, join_group_name: bool) -> Result<Vec<Member>, StoreError> {
        let path = if join_group_name {
            "members?select=*,groups(name)&order=created_at.asc"
        } else {
            "members?select=*&order=created_at.asc"
        };
        let rows: Vec<MemberRow> = self.fetch(path).await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn insert_member(&self, record: &NewMember) -> Result<(), StoreError> {
        let url = format!("{}/members", self.rest_url);
        let response = self
            .authorized(self.http.post(&url))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
