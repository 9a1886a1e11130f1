use kafkalite::{Broker, BrokerConfig};
use log::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => BrokerConfig::from_file(path)?,
        None => BrokerConfig::default(),
    };
    info!("Starting Kafka broker with config {:?}", config);

    // The catalog must load before anything is served
    let broker = Broker::new(config)?;

    broker.start().await
}
