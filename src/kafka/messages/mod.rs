//! Request and response schemas for the APIs this broker answers.
//!
//! Each message knows its own layout for every version it supports; the
//! header and framing live in [`crate::kafka::protocol`].

pub mod api_versions;
pub mod describe_topic_partitions;
pub mod fetch;

use bytes::{Bytes, BytesMut};

use crate::protocol::ProtocolError;

pub use api_versions::{ApiVersionRange, ApiVersionsRequest, ApiVersionsResponse};
pub use describe_topic_partitions::{
    Cursor, DescribeTopicPartitionsRequest, DescribeTopicPartitionsResponse, ResponsePartition,
    ResponseTopic, TOPIC_AUTHORIZED_OPERATIONS,
};
pub use fetch::{FetchPartition, FetchRequest, FetchResponse, FetchTopic, ForgottenTopic};

/// Body of a request, decoded after the request header.
pub trait RequestBody: Sized {
    fn decode(buf: &mut Bytes, version: i16) -> Result<Self, ProtocolError>;
}

/// Body of a response, encoded after the response header.
pub trait ResponseBody {
    fn encode(&self, buf: &mut BytesMut, version: i16);
}
