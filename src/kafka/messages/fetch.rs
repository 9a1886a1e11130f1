use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use super::{RequestBody, ResponseBody};
use crate::protocol::{KafkaBuf, KafkaBufMut, ProtocolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPartition {
    pub partition_index: i32,
    pub current_leader_epoch: i32,
    pub fetch_offset: i64,
    pub last_fetched_epoch: i32,
    pub log_start_offset: i64,
    pub partition_max_bytes: i32,
}

impl FetchPartition {
    fn decode(buf: &mut Bytes) -> Result<Self, ProtocolError> {
        let partition = Self {
            partition_index: buf.read_i32()?,
            current_leader_epoch: buf.read_i32()?,
            fetch_offset: buf.read_i64()?,
            last_fetched_epoch: buf.read_i32()?,
            log_start_offset: buf.read_i64()?,
            partition_max_bytes: buf.read_i32()?,
        };
        buf.skip_tagged_fields()?;
        Ok(partition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTopic {
    pub topic_id: Uuid,
    pub partitions: Vec<FetchPartition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgottenTopic {
    pub topic_id: Uuid,
    pub partitions: Vec<i32>,
}

/// Fetch request in the v13+ layout (topics addressed by id). From v15 the
/// replica id is no longer part of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub max_wait_ms: i32,
    pub min_bytes: i32,
    pub max_bytes: i32,
    pub isolation_level: i8,
    pub session_id: i32,
    pub session_epoch: i32,
    pub topics: Vec<FetchTopic>,
    pub forgotten_topics: Vec<ForgottenTopic>,
    pub rack_id: String,
}

impl RequestBody for FetchRequest {
    fn decode(buf: &mut Bytes, _version: i16) -> Result<Self, ProtocolError> {
        let max_wait_ms = buf.read_i32()?;
        let min_bytes = buf.read_i32()?;
        let max_bytes = buf.read_i32()?;
        let isolation_level = buf.read_i8()?;
        let session_id = buf.read_i32()?;
        let session_epoch = buf.read_i32()?;

        let topics = buf.read_compact_array(|buf| {
            let topic_id = buf.read_uuid()?;
            let partitions = buf.read_compact_array(FetchPartition::decode)?;
            buf.skip_tagged_fields()?;
            Ok(FetchTopic { topic_id, partitions })
        })?;
        let forgotten_topics = buf.read_compact_array(|buf| {
            let topic_id = buf.read_uuid()?;
            let partitions = buf.read_compact_i32_array()?;
            buf.skip_tagged_fields()?;
            Ok(ForgottenTopic { topic_id, partitions })
        })?;
        let rack_id = buf.read_compact_nullable_string()?.unwrap_or_default();
        buf.skip_tagged_fields()?;

        Ok(Self {
            max_wait_ms,
            min_bytes,
            max_bytes,
            isolation_level,
            session_id,
            session_epoch,
            topics,
            forgotten_topics,
            rack_id,
        })
    }
}

/// Fetch response without topic data; `responses` is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub throttle_time_ms: i32,
    pub error_code: i16,
    pub session_id: i32,
}

impl ResponseBody for FetchResponse {
    fn encode(&self, buf: &mut BytesMut, _version: i16) {
        buf.put_i32(self.throttle_time_ms);
        buf.put_i16(self.error_code);
        buf.put_i32(self.session_id);
        buf.put_compact_length(0);
        buf.put_empty_tagged_fields();
    }
}
