pub mod issue;
pub mod metrics;

pub use issue::*;
pub use metrics::*;
