pub mod catalog;
pub mod pack;
pub mod purchase;

pub use catalog::*;
pub use pack::*;
pub use purchase::*;
