mod store;
mod watch;

pub use crate::error::{ProgressError, ProgressLoadError};
pub use store::{CompletionOutcome, ProgressStore};
pub use watch::IdentityWatch;
