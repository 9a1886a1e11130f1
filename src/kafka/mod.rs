pub mod broker;
pub mod client;
pub mod messages;
pub mod protocol;

pub use broker::Broker;
