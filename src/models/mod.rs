pub mod insight;
pub mod transcript;

pub use insight::*;
pub use transcript::*;
