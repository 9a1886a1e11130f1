//! Shared fixtures for integration tests.
//!
//! [`SegmentBuilder`] writes real KRaft record-batch bytes so the metadata
//! parser can be exercised without a Kafka installation. [`request_frame`]
//! frames requests behind a header encoded by kafka-protocol.

#![allow(dead_code)]

use bytes::{BufMut, Bytes, BytesMut};
use kafka_protocol::messages::{ApiKey, RequestHeader};
use kafka_protocol::protocol::{Encodable, StrBytes};
use kafkalite::protocol::KafkaBufMut;
use uuid::Uuid;

const TOPIC_RECORD: u8 = 2;
const PARTITION_RECORD: u8 = 3;
const FEATURE_LEVEL_RECORD: u8 = 12;

pub const CONTROL_BATCH: i16 = 0x20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    pub index: i32,
    pub topic_id: Uuid,
    pub leader: i32,
    pub leader_epoch: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
}

impl PartitionSpec {
    pub fn new(index: i32, topic_id: Uuid, leader: i32) -> Self {
        Self {
            index,
            topic_id,
            leader,
            leader_epoch: 0,
            replicas: vec![leader],
            isr: vec![leader],
        }
    }
}

pub fn topic_value(name: &str, id: Uuid) -> Vec<u8> {
    let mut value = vec![1, TOPIC_RECORD, 0];
    value.put_compact_string(name);
    value.put_uuid(&id);
    value.put_empty_tagged_fields();
    value
}

pub fn partition_value(partition: &PartitionSpec) -> Vec<u8> {
    let mut value = vec![1, PARTITION_RECORD, 1];
    value.put_i32(partition.index);
    value.put_uuid(&partition.topic_id);
    value.put_compact_i32_array(&partition.replicas);
    value.put_compact_i32_array(&partition.isr);
    value.put_compact_i32_array(&[]); // removing replicas
    value.put_compact_i32_array(&[]); // adding replicas
    value.put_i32(partition.leader);
    value.put_i32(partition.leader_epoch);
    value.put_i32(0); // partition epoch
    value.put_compact_length(1); // directories
    value.put_uuid(&Uuid::from_u128(0x10));
    value.put_empty_tagged_fields();
    value
}

pub fn feature_level_value(name: &str, level: i16) -> Vec<u8> {
    let mut value = vec![1, FEATURE_LEVEL_RECORD, 0];
    value.put_compact_string(name);
    value.put_i16(level);
    value.put_empty_tagged_fields();
    value
}

/// Builds a metadata log segment one record batch at a time.
#[derive(Debug, Default)]
pub struct SegmentBuilder {
    segment: Vec<u8>,
    next_offset: i64,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(mut self, values: &[Vec<u8>]) -> Self {
        self.push_batch(0, values);
        self
    }

    pub fn control_batch(mut self) -> Self {
        // Leader change control record: key and value are opaque to the parser.
        self.push_batch(CONTROL_BATCH, &[vec![0, 0, 0, 2, 0, 0, 0, 1]]);
        self
    }

    pub fn topic(self, name: &str, id: Uuid) -> Self {
        self.batch(&[topic_value(name, id)])
    }

    pub fn build(self) -> Vec<u8> {
        self.segment
    }

    fn push_batch(&mut self, attributes: i16, values: &[Vec<u8>]) {
        let mut body = Vec::new();
        body.put_i32(1); // partition leader epoch
        body.put_i8(2); // magic
        body.put_u32(0); // crc, not verified
        body.put_i16(attributes);
        body.put_i32(values.len() as i32 - 1); // last offset delta
        body.put_i64(1_726_045_943_832); // base timestamp
        body.put_i64(1_726_045_943_832); // max timestamp
        body.put_i64(-1); // producer id
        body.put_i16(-1); // producer epoch
        body.put_i32(-1); // base sequence
        body.put_i32(values.len() as i32);

        for (delta, value) in values.iter().enumerate() {
            let mut record = Vec::new();
            record.put_u8(0); // attributes
            record.put_varint(0); // timestamp delta
            record.put_varint(delta as i64);
            record.put_varint(-1); // null key
            record.put_varint(value.len() as i64);
            record.put_slice(value);
            record.put_unsigned_varint(0); // headers
            body.put_varint(record.len() as i64);
            body.put_slice(&record);
        }

        self.segment.put_i64(self.next_offset);
        self.segment.put_i32(body.len() as i32);
        self.segment.put_slice(&body);
        self.next_offset += values.len() as i64;
    }
}

/// Size-prefixed request frame. The header version follows the api key and
/// version the same way a client picks it.
pub fn request_frame(
    api_key: i16,
    api_version: i16,
    correlation_id: i32,
    client_id: Option<&str>,
    body: &[u8],
) -> Bytes {
    let header = RequestHeader::default()
        .with_request_api_key(api_key)
        .with_request_api_version(api_version)
        .with_correlation_id(correlation_id)
        .with_client_id(client_id.map(|id| StrBytes::from_string(id.to_string())));
    let header_version = ApiKey::try_from(api_key)
        .map(|key| key.request_header_version(api_version))
        .unwrap_or(2);

    let mut message = BytesMut::new();
    header.encode(&mut message, header_version).unwrap();
    message.put_slice(body);

    let mut frame = BytesMut::new();
    frame.put_i32(message.len() as i32);
    frame.put_slice(&message);
    frame.freeze()
}
