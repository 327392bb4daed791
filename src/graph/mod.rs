pub mod builder;
pub mod cycle_guard;

pub use builder::ProjectGraph;
pub use cycle_guard::{DependencyValidation, find_path, validate_dependency};
