use std::sync::Arc;

use bytes::BytesMut;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::kafka::broker::Broker;

pub struct ClientState {
    pub broker: Arc<Broker>,
    pub client_host: String,
    pub tcp_reader: OwnedReadHalf,
    pub tcp_writer: OwnedWriteHalf,
    pub requests_served: u64,

    // Message buffers
    pub response_buffer: BytesMut,
}
