pub mod comment;
pub mod contact;
pub mod post;

pub use comment::{Comment, CommentParts};
pub use post::{Author, Post, PostStub};
