pub mod chat;
pub mod intent;
pub mod reminder;
pub mod service;
pub mod vehicle;

pub use chat::*;
pub use intent::*;
pub use reminder::*;
pub use service::*;
pub use vehicle::*;
