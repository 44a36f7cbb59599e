//! Auth module - the signed-in user, credentials and reading preferences.

mod credentials;
mod user;

pub use credentials::{LoginCredentials, Registration};
pub use user::{AuthTokenResponse, AuthenticatedUser, UserPreferences};
