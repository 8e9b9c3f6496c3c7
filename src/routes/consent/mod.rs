mod handler;
mod model;

pub use handler::{check_consent, close, confirm, get_consent, sign};
pub use model::{CheckRequest, ConsentResponse, SignatureRequest};
