mod helpers;
mod middleware;
mod token;

pub use helpers::{ValidatedToken, validate_token};
pub use middleware::{AuthError, RequireAdmin, RequireUser};
pub use token::{TokenGenerator, issue_token, parse_token};
