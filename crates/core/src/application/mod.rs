// Application Layer - batch composition and probe accessors

pub mod batch;
pub mod query;

pub use batch::ProbeBatch;
pub use query::ConfigProbe;
