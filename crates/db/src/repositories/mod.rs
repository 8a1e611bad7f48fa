//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod paper_repo;
pub mod unsubscribe_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use paper_repo::PaperRepo;
pub use unsubscribe_repo::UnsubscribeRepo;
pub use user_repo::UserRepo;
