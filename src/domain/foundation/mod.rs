//! Foundation - shared value objects and error types.

mod errors;
mod masking;
mod timestamp;

pub use errors::ValidationError;
pub use masking::mask_secret;
pub use timestamp::Timestamp;
