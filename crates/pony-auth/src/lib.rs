//! Dancing Pony Auth: password verification, session tokens, tenant
//! resolution, the request authorization pipeline and rate limiting.

pub mod authorize;
pub mod config;
pub mod error;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod tenant;
pub mod token;

pub use authorize::{Authorizer, Identity, bearer_token};
pub use config::AuthConfig;
pub use error::AuthError;
pub use rate_limit::{Admission, SlidingWindowLimiter};
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use tenant::resolve_tenant;
pub use token::{SessionClaims, TokenService};
