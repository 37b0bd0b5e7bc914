pub mod catalog;
pub mod error;
pub mod loose;
pub mod message;
pub mod movie;

pub use catalog::*;
pub use error::*;
pub use message::*;
pub use movie::*;
