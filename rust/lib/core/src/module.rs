use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The binary entry point collects all modules and mounts their routes
/// under `/api`.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes, to be nested under `/api`.
    fn routes(&self) -> Router;
}
