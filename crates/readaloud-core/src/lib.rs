//! Domain types shared by the readaloud feature crates

mod error;
mod profile;

pub use error::{HttpError, error_body, failure_body};
pub use profile::UserProfile;
