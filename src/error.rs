use thiserror::Error;

use crate::crm::DraftField;

/// 远端成员库调用失败
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed store response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("missing required fields: {}", join_labels(.0))]
    MissingFields(Vec<DraftField>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("controller has been shut down")]
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsentError {
    #[error("먼저 개인정보 수집에 동의해주세요.")]
    DialogClosed,

    #[error("서명을 입력해주세요.")]
    SignatureRequired,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

fn join_labels(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
