//! Business logic between the HTTP layer and the repositories.

pub mod analytics;
pub mod identity;
pub mod selections;
