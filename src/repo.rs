//! Post and User repositories over a shared [`DocumentStore`].
//!
//! The like toggle touches one post and one user through two independent writes; callers issue
//! them in sequence and nothing ties them together transactionally.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

pub mod posts;
pub mod users;

pub use posts::*;
pub use users::*;
