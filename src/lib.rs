pub mod config;
pub mod kafka;
pub mod metadata;
pub mod protocol;

pub use config::BrokerConfig;
pub use kafka::Broker;
pub use metadata::{MetadataError, TopicCatalog};
