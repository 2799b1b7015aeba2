//! Navigation port

/// Application entry point for unauthenticated principals
pub const LOGIN_PATH: &str = "/login";

/// Navigation capability of the hosting application.
///
/// The synchronizer invokes it exactly once per sign-out event; page-level
/// guards (outside this crate) use the same capability for role-based
/// redirects.
pub trait Navigator: Send + Sync {
    /// Navigate the application to the given path.
    fn navigate(&self, path: &str);
}
