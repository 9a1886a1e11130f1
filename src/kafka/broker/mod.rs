mod broker;

pub use broker::Broker;
