pub mod catalog;
pub mod injector;
pub mod recommend;
pub mod scanner;

pub use catalog::{LinkCatalogs, LinkRule};
pub use injector::{InjectionConfig, InjectionResult, inject};
pub use recommend::recommend;
