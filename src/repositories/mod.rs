pub mod posts;

pub use posts::{PostRepository, PostRepositoryTrait};

#[cfg(test)]
pub use posts::MockPostRepositoryTrait;
