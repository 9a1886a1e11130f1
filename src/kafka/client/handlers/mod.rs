mod api_versions;
mod describe_topic_partitions;
mod fetch;

use bytes::Bytes;
use log::{debug, warn};

use crate::kafka::protocol::{KafkaRequestMessage, KafkaResponseMessage, RequestError, RequestKind, ResponseKind};
use crate::metadata::TopicCatalog;
use crate::protocol::ProtocolError;

pub use api_versions::SUPPORTED_API_VERSIONS;
pub(crate) use api_versions::handle_api_versions;
pub(crate) use describe_topic_partitions::handle_describe_topic_partitions;
pub(crate) use fetch::handle_fetch;

/// Routes a decoded request to its handler.
pub fn process_request(catalog: &TopicCatalog, request: KafkaRequestMessage) -> KafkaResponseMessage {
    debug!(
        "Processing request: api_key={}, api_version={}, correlation_id={}",
        request.header.api_key, request.header.api_version, request.header.correlation_id
    );

    let response = match &request.request {
        RequestKind::ApiVersions(req) => ResponseKind::ApiVersions(handle_api_versions(req)),
        RequestKind::DescribeTopicPartitions(req) => {
            ResponseKind::DescribeTopicPartitions(handle_describe_topic_partitions(catalog, req))
        }
        RequestKind::Fetch(req) => ResponseKind::Fetch(handle_fetch(catalog, req)),
    };
    KafkaResponseMessage::new(&request.header, response)
}

/// Decodes one size-prefixed frame and produces the response to send back.
///
/// A key/version pair outside the gate is answered with the bare
/// UNSUPPORTED_VERSION response. Malformed frames are returned as errors and
/// get no response.
pub fn handle_frame(catalog: &TopicCatalog, frame: &mut Bytes) -> Result<KafkaResponseMessage, ProtocolError> {
    match KafkaRequestMessage::decode(frame) {
        Ok(request) => Ok(process_request(catalog, request)),
        Err(RequestError::UnsupportedVersion(header)) => {
            warn!(
                "Unsupported api_key={} api_version={} (correlation_id={})",
                header.api_key, header.api_version, header.correlation_id
            );
            Ok(KafkaResponseMessage::unsupported_version(&header))
        }
        Err(RequestError::Protocol(e)) => Err(e),
    }
}
