//! Entity rows, insert payloads and change sets
//!
//! Relationships are plain foreign-key fields. Related rows are loaded
//! through the repositories, never attached automatically.

pub mod book;
pub mod pagination;
pub mod review;
pub mod tag;
pub mod user;

pub use book::{Book, BookChanges, BookDetails, BookTag, NewBook};
pub use pagination::{Paginated, Pagination};
pub use review::{NewReview, Review, ReviewChanges};
pub use tag::{NewTag, Tag};
pub use user::{NewUser, Role, User, UserChanges, UserDetails, DEFAULT_ROLE};
