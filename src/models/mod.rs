pub mod enums;
pub mod filters;
pub mod patient;
pub mod reply;

pub use enums::*;
pub use filters::*;
pub use patient::*;
pub use reply::*;
