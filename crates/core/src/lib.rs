// cfgprobe Core - Domain Logic & Ports
// NO infrastructure dependencies: process spawning lives in cfgprobe-infra-system

pub mod application;
pub mod domain;
pub mod port;

pub use application::{ConfigProbe, ProbeBatch};
pub use domain::error::{ProbeError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
