//! Command modules for the Referendum CLI

pub mod compile;
pub mod deployments;
pub mod handle;

pub use compile::compile;
pub use deployments::list_deployments;
pub use handle::{enact, factory, FactoryTarget};
