// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod tamper;
pub mod validation;

pub use chain::*;
pub use tamper::*;
pub use validation::*;
