pub mod quote;
pub mod similarity;

pub use quote::*;
pub use similarity::*;
