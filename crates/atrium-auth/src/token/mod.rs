//! Token lifecycle: JWT encoding/decoding and the login/refresh/logout flows.

pub mod jwt;
pub mod service;

pub use jwt::{JwtService, TokenClaims};
pub use service::{Credential, TokenPair, TokenService};
