//! HTTP implementation of the polsync remote accessor
//!
//! [`HttpRemote`] implements [`polsync_core::RemoteAccessor`] with a
//! blocking `reqwest` client: one request per call, bearer-token auth, no
//! retries. Non-success responses become [`polsync_core::RemoteError::Status`]
//! carrying the status code and response body.

pub mod client;
pub mod error;

pub use client::HttpRemote;
pub use error::{Error, Result};
