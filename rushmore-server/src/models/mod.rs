//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod post;
pub mod category;
pub mod comment;
pub mod sort;

pub use validation::ValidationError;
pub use post::{paragraphs, AuthorName, NewPost, PostContent, PostTitle};
pub use category::{CategoryName, CategoryRef, NewCategory};
pub use comment::CommentContent;
pub use sort::{CommentLimit, CommentSort, PostOrder};
