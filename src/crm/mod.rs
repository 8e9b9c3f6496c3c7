mod controller;
mod draft;
pub mod format;
mod stats;

pub use controller::{CrmController, CrmSettings, DraftView, SubmitReceipt};
pub use draft::{DraftField, DraftPhase, FieldInput, MemberDraft, UnknownField};
pub use stats::{GroupCounts, GroupingMode, UNKNOWN_GROUP_LABEL, compute_group_counts};
