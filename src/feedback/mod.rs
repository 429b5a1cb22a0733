//! Feedback posts: filtered, cursor-paginated listing, anonymization and
//! read tracking. Every operation takes an explicit connection and viewer.

pub mod anonymize;
pub mod filter;
pub mod markup;
pub mod pagination;
pub mod projection;
pub mod read_tracking;
pub mod service;

pub use anonymize::{anonymize, AuthorView, CommentView, PostView};
pub use filter::PostFilter;
pub use pagination::{Page, PageRequest, SortOrder};
pub use service::{NewComment, NewPost};
