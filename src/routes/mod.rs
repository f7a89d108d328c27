/// Router Module Index
///
/// Routes are split by who may reach them. The split decides which middleware
/// wraps them; role checks happen inside each handler.

/// Routes accessible to anyone (health checks).
pub mod public;

/// Routes for any signed-in role, plus the user and store-owner features.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
