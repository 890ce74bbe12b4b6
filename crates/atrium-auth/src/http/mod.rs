//! HTTP surface for the auth subsystem.

pub mod auth;
pub mod error;
pub mod response;

pub use auth::{AuthHttpState, router};
pub use response::HttpResponse;
