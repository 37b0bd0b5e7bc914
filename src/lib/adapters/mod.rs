pub mod http;
pub mod payload;

pub use http::{AppState, HttpServer};
pub use payload::Payload;
