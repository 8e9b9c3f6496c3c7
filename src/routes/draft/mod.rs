mod handler;
mod model;

pub use handler::{get_draft, submit, update_field};
pub use model::UpdateFieldRequest;
