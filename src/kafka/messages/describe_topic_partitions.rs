use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use super::{RequestBody, ResponseBody};
use crate::protocol::{KafkaBuf, KafkaBufMut, ProtocolError};

/// Authorized-operations bitfield reported for every topic.
pub const TOPIC_AUTHORIZED_OPERATIONS: i32 = 0x0000_0df8;

/// Pagination cursor; `None` on the wire is a single `0xff` byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub topic_name: String,
    pub partition_index: i32,
}

impl Cursor {
    fn decode_nullable(buf: &mut Bytes) -> Result<Option<Self>, ProtocolError> {
        if buf.read_i8()? < 0 {
            return Ok(None);
        }
        let topic_name = buf.read_compact_string()?;
        let partition_index = buf.read_i32()?;
        buf.skip_tagged_fields()?;
        Ok(Some(Self { topic_name, partition_index }))
    }

    fn encode_nullable(cursor: Option<&Self>, buf: &mut BytesMut) {
        match cursor {
            Some(cursor) => {
                buf.put_i8(1);
                buf.put_compact_string(&cursor.topic_name);
                buf.put_i32(cursor.partition_index);
                buf.put_empty_tagged_fields();
            }
            None => buf.put_i8(-1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsRequest {
    pub topics: Vec<String>,
    pub response_partition_limit: i32,
    pub cursor: Option<Cursor>,
}

impl RequestBody for DescribeTopicPartitionsRequest {
    fn decode(buf: &mut Bytes, _version: i16) -> Result<Self, ProtocolError> {
        let topics = buf.read_compact_array(|buf| {
            let name = buf.read_compact_string()?;
            buf.skip_tagged_fields()?;
            Ok(name)
        })?;
        let response_partition_limit = buf.read_i32()?;
        let cursor = Cursor::decode_nullable(buf)?;
        buf.skip_tagged_fields()?;

        Ok(Self {
            topics,
            response_partition_limit,
            cursor,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponsePartition {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
    pub eligible_leader_replicas: Vec<i32>,
    pub last_known_elr: Vec<i32>,
    pub offline_replicas: Vec<i32>,
}

impl ResponsePartition {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.error_code);
        buf.put_i32(self.partition_index);
        buf.put_i32(self.leader_id);
        buf.put_i32(self.leader_epoch);
        buf.put_compact_i32_array(&self.replica_nodes);
        buf.put_compact_i32_array(&self.isr_nodes);
        buf.put_compact_i32_array(&self.eligible_leader_replicas);
        buf.put_compact_i32_array(&self.last_known_elr);
        buf.put_compact_i32_array(&self.offline_replicas);
        buf.put_empty_tagged_fields();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTopic {
    pub error_code: i16,
    pub name: String,
    pub topic_id: Uuid,
    pub is_internal: bool,
    pub partitions: Vec<ResponsePartition>,
    pub topic_authorized_operations: i32,
}

impl ResponseTopic {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.error_code);
        buf.put_compact_string(&self.name);
        buf.put_uuid(&self.topic_id);
        buf.put_u8(self.is_internal as u8);
        buf.put_compact_array(&self.partitions, |buf, partition| partition.encode(buf));
        buf.put_i32(self.topic_authorized_operations);
        buf.put_empty_tagged_fields();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeTopicPartitionsResponse {
    pub throttle_time_ms: i32,
    pub topics: Vec<ResponseTopic>,
    pub next_cursor: Option<Cursor>,
}

impl ResponseBody for DescribeTopicPartitionsResponse {
    fn encode(&self, buf: &mut BytesMut, _version: i16) {
        buf.put_i32(self.throttle_time_ms);
        buf.put_compact_array(&self.topics, |buf, topic| topic.encode(buf));
        Cursor::encode_nullable(self.next_cursor.as_ref(), buf);
        buf.put_empty_tagged_fields();
    }
}
