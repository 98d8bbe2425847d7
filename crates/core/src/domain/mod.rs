// Domain Layer - probe model and output encoding

pub mod error;
pub mod probe;
pub mod script;

pub use error::{ProbeError, Result};
pub use probe::{ProbeKey, Tag, TAG_NAMESPACE};
pub use script::RuntimeTarget;
