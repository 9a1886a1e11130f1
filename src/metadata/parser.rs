use bytes::Buf;
use log::{debug, trace, warn};
use uuid::Uuid;

use super::{MetadataError, Partition, TopicCatalog};
use crate::protocol::{KafkaBuf, ProtocolError};

const TOPIC_RECORD: u8 = 2;
const PARTITION_RECORD: u8 = 3;

const RECORD_BATCH_MAGIC: i8 = 2;
const COMPRESSION_CODEC_MASK: i16 = 0x07;
const CONTROL_BATCH_FLAG: i16 = 0x20;

// last offset delta (4) + base timestamp (8) + max timestamp (8)
// + producer id (8) + producer epoch (2) + base sequence (4)
const POST_ATTRIBUTES_SIZE: usize = 34;

struct RecordBatch<'a> {
    base_offset: i64,
    magic: i8,
    attributes: i16,
    records_count: i32,
    records: &'a [u8],
}

enum MetadataRecord {
    Topic { name: String, id: Uuid },
    Partition { topic_id: Uuid, partition: Partition },
    Other(u8),
}

/// Rebuilds the topic catalog from one raw metadata log segment.
///
/// Partition records are attached to their topic only after the whole
/// segment has been read, so a partition may precede its topic record.
/// Partitions whose topic id never appears are dropped.
pub fn parse_segment(segment: &[u8]) -> Result<TopicCatalog, MetadataError> {
    let mut catalog = TopicCatalog::new();
    let mut pending = Vec::new();
    let mut cursor = segment;

    while cursor.has_remaining() {
        let batch_start = segment.len() - cursor.remaining();
        let corrupt = |reason: String| MetadataError::Corrupt {
            offset: batch_start,
            reason,
        };

        let batch = next_batch(&mut cursor).map_err(|e| corrupt(e.to_string()))?;
        trace!(
            "Record batch at offset {}: base_offset={}, attributes={:#x}, records={}",
            batch_start, batch.base_offset, batch.attributes, batch.records_count
        );

        if batch.magic != RECORD_BATCH_MAGIC {
            return Err(corrupt(format!("unsupported record batch magic {}", batch.magic)));
        }
        if batch.attributes & CONTROL_BATCH_FLAG != 0 {
            debug!("Skipping control batch at base offset {}", batch.base_offset);
            continue;
        }
        if batch.attributes & COMPRESSION_CODEC_MASK != 0 {
            return Err(corrupt(format!(
                "compressed batch at base offset {} is not supported",
                batch.base_offset
            )));
        }

        let mut records = batch.records;
        for index in 0..batch.records_count {
            let record = next_record(&mut records).map_err(|e| {
                corrupt(format!(
                    "record {} of batch at base offset {}: {}",
                    index, batch.base_offset, e
                ))
            })?;

            match record {
                Some(MetadataRecord::Topic { name, id }) => {
                    debug!("Topic record: name={}, id={}", name, id);
                    catalog.insert_topic(name, id);
                }
                Some(MetadataRecord::Partition { topic_id, partition }) => {
                    debug!(
                        "Partition record: topic_id={}, index={}, leader={}",
                        topic_id, partition.partition_index, partition.leader_id
                    );
                    pending.push((topic_id, partition));
                }
                Some(MetadataRecord::Other(record_type)) => {
                    trace!("Skipping metadata record of type {}", record_type);
                }
                None => {}
            }
        }
    }

    for (topic_id, partition) in pending {
        let index = partition.partition_index;
        if !catalog.attach_partition(topic_id, partition) {
            warn!("Dropping partition {} of unknown topic id {}", index, topic_id);
        }
    }

    Ok(catalog)
}

fn to_len(value: i64) -> Result<usize, ProtocolError> {
    usize::try_from(value).map_err(|_| ProtocolError::InvalidLength(value))
}

fn take<'a>(cursor: &mut &'a [u8], len: usize) -> Result<&'a [u8], ProtocolError> {
    cursor.ensure(len)?;
    let whole: &'a [u8] = *cursor;
    let (head, tail) = whole.split_at(len);
    *cursor = tail;
    Ok(head)
}

fn next_batch<'a>(cursor: &mut &'a [u8]) -> Result<RecordBatch<'a>, ProtocolError> {
    let base_offset = cursor.read_i64()?;
    let batch_length = cursor.read_i32()?;
    let mut body = take(cursor, to_len(batch_length.into())?)?;

    body.skip(4)?; // partition leader epoch
    let magic = body.read_i8()?;
    body.skip(4)?; // crc
    let attributes = body.read_i16()?;
    body.skip(POST_ATTRIBUTES_SIZE)?;
    let records_count = body.read_i32()?;

    Ok(RecordBatch {
        base_offset,
        magic,
        attributes,
        records_count,
        records: body,
    })
}

/// Returns `None` for records without a value.
fn next_record(cursor: &mut &[u8]) -> Result<Option<MetadataRecord>, ProtocolError> {
    let length = cursor.read_varint()?;
    let mut record = take(cursor, to_len(length)?)?;

    record.skip(1)?; // attributes
    let _timestamp_delta = record.read_varint()?;
    let _offset_delta = record.read_varint()?;
    let key_length = record.read_varint()?;
    if key_length > 0 {
        record.skip(to_len(key_length)?)?;
    }

    let value_length = record.read_varint()?;
    if value_length < 0 {
        return Ok(None);
    }
    let value = take(&mut record, to_len(value_length)?)?;
    parse_value(value).map(Some)
}

fn parse_value(mut value: &[u8]) -> Result<MetadataRecord, ProtocolError> {
    let _frame_version = value.read_u8()?;
    let record_type = value.read_u8()?;
    let _version = value.read_u8()?;

    match record_type {
        TOPIC_RECORD => {
            let name = value.read_compact_string()?;
            let id = value.read_uuid()?;
            Ok(MetadataRecord::Topic { name, id })
        }
        PARTITION_RECORD => {
            let partition_index = value.read_i32()?;
            let topic_id = value.read_uuid()?;
            let replica_ids = value.read_compact_i32_array()?;
            let in_sync_replica_ids = value.read_compact_i32_array()?;
            let _removing_replicas = value.read_compact_i32_array()?;
            let _adding_replicas = value.read_compact_i32_array()?;
            let leader_id = value.read_i32()?;
            let leader_epoch = value.read_i32()?;

            Ok(MetadataRecord::Partition {
                topic_id,
                partition: Partition {
                    partition_index,
                    leader_id,
                    leader_epoch,
                    replica_ids,
                    in_sync_replica_ids,
                    ..Partition::default()
                },
            })
        }
        other => Ok(MetadataRecord::Other(other)),
    }
}
