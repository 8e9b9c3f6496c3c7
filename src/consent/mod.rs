//! 개인정보 수집 동의
//!
//! 勾选后弹出对话框，输入姓名作为电子签名才能以“同意”关闭。
//! 状态只保存在本进程，不写入成员库。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ConsentError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DisclosureSection {
    pub title: &'static str,
    pub body: &'static str,
}

pub const DISCLOSURE_TITLE: &str = "개인정보 수집 및 이용 동의서";

pub static DISCLOSURE: [DisclosureSection; 5] = [
    DisclosureSection {
        title: "1. 개인정보 수집 목적",
        body: "서비스 이용자 식별, 구성원 관리 및 통계 분석 등 CRM 운영 목적",
    },
    DisclosureSection {
        title: "2. 수집 항목",
        body: "이름, 전화번호, 소속(그룹), 등록일 등",
    },
    DisclosureSection {
        title: "3. 보유 및 이용 기간",
        body: "회원 탈퇴 시까지 또는 관련 법령에 따른 기간",
    },
    DisclosureSection {
        title: "4. 제3자 제공 여부",
        body: "없음 (단, 법령에 따른 제공 예외 있음)",
    },
    DisclosureSection {
        title: "5. 정보주체의 권리",
        body: "열람, 정정, 삭제 요청 가능. 동의 거부 시 서비스 이용 제한 가능성 있음.",
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsentForm {
    pub agreed: bool,
    pub dialog_open: bool,
    pub signature: String,
    pub agreed_at: Option<DateTime<Utc>>,
}

impl ConsentForm {
    /// 勾选即打开对话框，取消勾选同时撤回同意
    pub fn set_checked(&mut self, checked: bool) {
        self.agreed = checked;
        self.dialog_open = checked;
        if !checked {
            self.agreed_at = None;
        }
    }

    pub fn set_signature(&mut self, signature: impl Into<String>) {
        self.signature = signature.into();
    }

    /// 只有勾选打开的对话框才能以签名确认关闭
    pub fn confirm(&mut self) -> Result<(), ConsentError> {
        if !self.dialog_open {
            return Err(ConsentError::DialogClosed);
        }
        if self.signature.trim().is_empty() {
            return Err(ConsentError::SignatureRequired);
        }
        self.agreed = true;
        self.dialog_open = false;
        self.agreed_at = Some(Utc::now());
        tracing::info!("Privacy consent signed");
        Ok(())
    }

    pub fn close(&mut self) {
        self.dialog_open = false;
    }

    pub fn is_signed(&self) -> bool {
        self.agreed && self.agreed_at.is_some()
    }
}
