pub mod models;
pub mod range;
pub mod tier;

pub use models::*;
pub use range::*;
pub use tier::*;
