use std::ops::RangeInclusive;

use bytes::{BufMut, Bytes, BytesMut};
use kafka_protocol::error::ResponseError;
use kafka_protocol::messages::ApiKey;
use log::{debug, trace};
use thiserror::Error;

use super::messages::*;
use crate::protocol::{KafkaBuf, KafkaBufMut, ProtocolError};

/// Versions answered for ApiVersions and DescribeTopicPartitions.
pub const SUPPORTED_VERSIONS: RangeInclusive<i16> = 0..=4;

/// The only Fetch version this broker decodes.
pub const FETCH_VERSION: i16 = 16;

#[derive(Error, Debug)]
pub enum RequestError {
    /// The header decoded but the api key/version pair is not served.
    #[error("unsupported version {} for api key {}", .0.api_version, .0.api_key)]
    UnsupportedVersion(RequestHeader),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
}

impl RequestHeader {
    /// Decodes the header of a full frame, including its 4-byte size prefix.
    ///
    /// The size has already been validated by whoever framed the message and
    /// is skipped here.
    pub fn decode(frame: &mut Bytes) -> Result<Self, ProtocolError> {
        let _size = frame.read_i32()?;
        let api_key = frame.read_i16()?;
        let api_version = frame.read_i16()?;
        let correlation_id = frame.read_i32()?;
        let client_id = frame.read_nullable_string()?;

        // Header v2 adds a tagged-field section; unknown keys are assumed flexible.
        let header_version = ApiKey::try_from(api_key)
            .map(|key| key.request_header_version(api_version))
            .unwrap_or(2);
        if header_version >= 2 {
            frame.skip_tagged_fields()?;
        }

        Ok(Self {
            api_key,
            api_version,
            correlation_id,
            client_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    ApiVersions(ApiVersionsRequest),
    DescribeTopicPartitions(DescribeTopicPartitionsRequest),
    Fetch(FetchRequest),
}

impl RequestKind {
    /// Decodes the body for `header`, or rejects the key/version pair.
    ///
    /// ApiVersions and DescribeTopicPartitions accept [`SUPPORTED_VERSIONS`];
    /// Fetch accepts only [`FETCH_VERSION`].
    pub fn decode(header: &RequestHeader, buf: &mut Bytes) -> Result<Self, RequestError> {
        let version = header.api_version;
        let request = match ApiKey::try_from(header.api_key) {
            Ok(ApiKey::ApiVersions) if SUPPORTED_VERSIONS.contains(&version) => {
                Self::ApiVersions(ApiVersionsRequest::decode(buf, version)?)
            }
            Ok(ApiKey::DescribeTopicPartitions) if SUPPORTED_VERSIONS.contains(&version) => {
                Self::DescribeTopicPartitions(DescribeTopicPartitionsRequest::decode(buf, version)?)
            }
            Ok(ApiKey::Fetch) if version == FETCH_VERSION => {
                Self::Fetch(FetchRequest::decode(buf, version)?)
            }
            _ => return Err(RequestError::UnsupportedVersion(header.clone())),
        };
        Ok(request)
    }
}

// Represents a parsed Kafka request with its header and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaRequestMessage {
    pub header: RequestHeader,
    pub request: RequestKind,
}

impl KafkaRequestMessage {
    pub fn decode(frame: &mut Bytes) -> Result<Self, RequestError> {
        trace!("Decoding frame: {:?}", frame);
        let header = RequestHeader::decode(frame)?;
        debug!(
            "Decoded request header: api_key={}, api_version={}, correlation_id={}, client_id={:?}",
            header.api_key, header.api_version, header.correlation_id, header.client_id
        );

        let request = RequestKind::decode(&header, frame)?;
        if !frame.is_empty() {
            trace!("Ignoring {} trailing bytes after request body", frame.len());
        }
        Ok(Self { header, request })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    ApiVersions(ApiVersionsResponse),
    DescribeTopicPartitions(DescribeTopicPartitionsResponse),
    Fetch(FetchResponse),
    /// Bare error code with no body, sent when a request cannot be served.
    Error(i16),
}

impl ResponseKind {
    fn encode(&self, buf: &mut BytesMut, version: i16) {
        match self {
            Self::ApiVersions(response) => response.encode(buf, version),
            Self::DescribeTopicPartitions(response) => response.encode(buf, version),
            Self::Fetch(response) => response.encode(buf, version),
            Self::Error(error_code) => buf.put_i16(*error_code),
        }
    }
}

// Represents a processed response ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaResponseMessage {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    pub response: ResponseKind,
}

impl KafkaResponseMessage {
    pub fn new(header: &RequestHeader, response: ResponseKind) -> Self {
        Self {
            api_key: header.api_key,
            api_version: header.api_version,
            correlation_id: header.correlation_id,
            response,
        }
    }

    pub fn unsupported_version(header: &RequestHeader) -> Self {
        Self::new(header, ResponseKind::Error(ResponseError::UnsupportedVersion.code()))
    }

    /// Header v1 appends a tagged-field section to the correlation id.
    fn header_version(&self) -> i16 {
        if let ResponseKind::Error(_) = self.response {
            return 0;
        }
        ApiKey::try_from(self.api_key)
            .map(|key| key.response_header_version(self.api_version))
            .unwrap_or(0)
    }

    /// Writes the size-prefixed frame for this response.
    pub fn encode(&self, buffer: &mut BytesMut) {
        let mut header = BytesMut::with_capacity(5);
        header.put_i32(self.correlation_id);
        if self.header_version() >= 1 {
            header.put_empty_tagged_fields();
        }

        let mut body = BytesMut::new();
        self.response.encode(&mut body, self.api_version);

        let size = header.len() + body.len();
        debug!(
            "Encoding response: api_key={}, api_version={}, correlation_id={}, size={}",
            self.api_key, self.api_version, self.correlation_id, size
        );

        buffer.reserve(4 + size);
        buffer.put_i32(size as i32);
        buffer.put_slice(&header);
        buffer.put_slice(&body);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode(&mut buffer);
        buffer.freeze()
    }
}
