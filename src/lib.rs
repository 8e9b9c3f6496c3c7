use std::sync::Arc;

use tokio::sync::Mutex;

use config::Config;
use consent::ConsentForm;
use crm::CrmController;

pub mod config;
pub mod consent;
pub mod crm;
pub mod error;
pub mod middleware;
pub mod models;
pub mod result;
pub mod router;
pub mod routes;
pub mod store;
pub mod utils;

/// 进程级共享状态
///
/// 整个服务只有一份草稿和一份同意书，对应单一的录入界面：所有客户端
/// 看到并编辑的是同一条待提交记录。需要多人各自录入时应分别部署。
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<CrmController>,
    pub consent: Arc<Mutex<ConsentForm>>,
    pub config: Config,
}

impl AppState {
    pub fn new(crm: Arc<CrmController>, config: Config) -> Self {
        Self {
            crm,
            consent: Arc::new(Mutex::new(ConsentForm::default())),
            config,
        }
    }
}
