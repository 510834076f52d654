//! service-core: shared infrastructure for the account service.

pub mod error;
pub mod middleware;
pub mod observability;
