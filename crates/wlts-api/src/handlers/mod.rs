mod collections;
mod health;
mod trajectory;

pub use collections::{describe_collection, list_collections};
pub use health::{health_check, root};
pub use trajectory::get_trajectory;
