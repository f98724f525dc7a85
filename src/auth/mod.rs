//! Authentication module
//!
//! JWT bearer authentication plus the role and permission guards that
//! protect routes. Route requirements live in an explicit [`RouteTable`]
//! built at startup.

pub mod guard;
pub mod token;
pub mod user;

pub use guard::{GuardState, RoutePolicy, RouteTable, authenticate, bearer_token, guard};
pub use token::{Claims, JwtKeys};
pub use user::{AuthenticatedUser, User};
