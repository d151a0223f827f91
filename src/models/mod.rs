pub mod collection;
pub mod user;

pub use collection::{Collection, CollectionItem};
pub use user::User;
