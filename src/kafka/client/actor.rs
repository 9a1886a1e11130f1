use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, error, info, warn};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::handlers::handle_frame;
use super::types::ClientState;
use crate::kafka::broker::Broker;
use crate::kafka::protocol::KafkaResponseMessage;

pub struct ClientActor;

#[derive(Debug)]
pub enum Message {
    ReadRequest,
    SendResponse(KafkaResponseMessage),
}

pub struct Args {
    pub tcp_stream: TcpStream,
    pub broker: Arc<Broker>,
}

impl Actor for ClientActor {
    type Msg = Message;
    type State = ClientState;
    type Arguments = Args;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let (tcp_reader, tcp_writer) = args.tcp_stream.into_split();
        let client_host = tcp_writer
            .peer_addr()
            .map_or_else(|_| "".to_string(), |peer| peer.to_string());
        debug!("Client connected from {}", client_host);

        let state = ClientState {
            broker: args.broker,
            client_host,
            tcp_reader,
            tcp_writer,
            requests_served: 0,
            response_buffer: BytesMut::with_capacity(4096),
        };

        // Begin reading from TCP stream
        myself.send_message(Message::ReadRequest)?;

        Ok(state)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            Message::ReadRequest => {
                let mut frame = match read_frame(state).await {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        myself.stop(Some("connection closed by peer".to_string()));
                        return Ok(());
                    }
                    Err(e) => {
                        warn!("Closing connection from {}: {:#}", state.client_host, e);
                        myself.stop(Some(e.to_string()));
                        return Ok(());
                    }
                };

                match handle_frame(state.broker.catalog(), &mut frame) {
                    Ok(response) => myself.send_message(Message::SendResponse(response))?,
                    Err(e) => {
                        error!("Malformed request from {}: {}", state.client_host, e);
                        myself.stop(Some(e.to_string()));
                    }
                }
            }

            Message::SendResponse(response) => {
                state.response_buffer.clear();
                response.encode(&mut state.response_buffer);

                let write_timeout = state.broker.config().idle_timeout();
                let result = timeout(write_timeout, async {
                    state.tcp_writer.write_all(&state.response_buffer).await?;
                    state.tcp_writer.flush().await?;
                    Ok::<_, std::io::Error>(())
                })
                .await;

                match result {
                    Ok(Ok(())) => {
                        state.requests_served += 1;
                        // The next frame is read only once this response is out.
                        myself.send_message(Message::ReadRequest)?;
                    }
                    Ok(Err(e)) => {
                        error!("Failed to write response to {}: {:?}", state.client_host, e);
                        myself.stop(Some(e.to_string()));
                    }
                    Err(_) => {
                        warn!("Timed out writing response to {}", state.client_host);
                        myself.stop(Some("write timeout".to_string()));
                    }
                }
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        info!(
            "Client disconnected: {} after {} requests",
            state.client_host, state.requests_served
        );
        Ok(())
    }
}

/// Reads one size-prefixed frame, returning it with the prefix still in place.
///
/// `Ok(None)` means the peer closed the connection between frames.
async fn read_frame(state: &mut ClientState) -> Result<Option<Bytes>, anyhow::Error> {
    let config = state.broker.config();
    let idle_timeout = config.idle_timeout();
    let max_message_size = config.max_message_size;

    let size = match timeout(idle_timeout, state.tcp_reader.read_i32()).await {
        Ok(Ok(size)) => size,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Ok(Err(e)) => return Err(e).context("reading message size"),
        Err(_) => bail!("idle for {:?}", idle_timeout),
    };
    if size <= 0 || size as usize > max_message_size {
        bail!("invalid message size: {}", size);
    }

    let mut frame = BytesMut::with_capacity(4 + size as usize);
    frame.put_i32(size);
    frame.resize(4 + size as usize, 0);

    timeout(idle_timeout, state.tcp_reader.read_exact(&mut frame[4..]))
        .await
        .map_err(|_| anyhow!("timed out reading {} byte message body", size))?
        .context("reading message body")?;

    Ok(Some(frame.freeze()))
}
