pub mod pull_request;
pub mod rule;
pub mod analysis;

pub use pull_request::*;
pub use rule::*;
pub use analysis::*;
