//! Outbound HTTP Adapters
//!
//! - `ReqwestHttpRequester` - HTTP actions over reqwest

mod reqwest_requester;

pub use reqwest_requester::ReqwestHttpRequester;
