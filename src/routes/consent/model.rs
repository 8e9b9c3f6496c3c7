use serde::{Deserialize, Serialize};

use crate::consent::{ConsentForm, DISCLOSURE, DISCLOSURE_TITLE, DisclosureSection};

#[derive(Debug, Deserialize, Serialize)]
pub struct CheckRequest {
    pub checked: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SignatureRequest {
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub title: &'static str,
    pub disclosure: &'static [DisclosureSection],
    #[serde(flatten)]
    pub form: ConsentForm,
    pub signed: bool,
}

impl From<ConsentForm> for ConsentResponse {
    fn from(form: ConsentForm) -> Self {
        Self {
            title: DISCLOSURE_TITLE,
            disclosure: &DISCLOSURE,
            signed: form.is_signed(),
            form,
        }
    }
}
