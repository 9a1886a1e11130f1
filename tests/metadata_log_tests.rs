// Metadata log parsing against segments built from real record-batch bytes.

mod common;

use std::io::Write;

use common::*;
use kafkalite::metadata::{parse_segment, MetadataError, TopicCatalog};
use uuid::Uuid;

fn two_topic_segment() -> Vec<u8> {
    let foo = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0091);
    let bar = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0042);
    SegmentBuilder::new()
        .batch(&[feature_level_value("metadata.version", 20)])
        .batch(&[
            topic_value("foo", foo),
            partition_value(&PartitionSpec::new(0, foo, 1)),
            partition_value(&PartitionSpec::new(1, foo, 1)),
        ])
        .control_batch()
        .batch(&[
            topic_value("bar", bar),
            partition_value(&PartitionSpec::new(0, bar, 1)),
        ])
        .build()
}

#[test]
fn test_parses_topics_and_partitions() {
    let catalog = parse_segment(&two_topic_segment()).unwrap();

    assert_eq!(catalog.topic_count(), 2);
    assert_eq!(catalog.partition_count(), 3);

    let foo = catalog.get("foo").unwrap();
    let indexes: Vec<_> = foo.partitions.iter().map(|p| p.partition_index).collect();
    assert_eq!(indexes, vec![0, 1]);
    assert_eq!(foo.partitions[0].leader_id, 1);
    assert_eq!(foo.partitions[0].replica_ids, vec![1]);
    assert_eq!(foo.partitions[0].in_sync_replica_ids, vec![1]);
    assert!(foo.partitions[0].eligible_leader_replica_ids.is_empty());
}

#[test]
fn test_topics_keep_discovery_order() {
    let catalog = parse_segment(&two_topic_segment()).unwrap();
    let names: Vec<_> = catalog.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["foo", "bar"]);
}

#[test]
fn test_parsing_is_idempotent() {
    let segment = two_topic_segment();
    let first = parse_segment(&segment).unwrap();
    let second = parse_segment(&segment).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_partition_before_topic_is_attached() {
    let id = Uuid::from_u128(7);
    let segment = SegmentBuilder::new()
        .batch(&[partition_value(&PartitionSpec::new(0, id, 2))])
        .topic("late", id)
        .build();

    let catalog = parse_segment(&segment).unwrap();
    assert_eq!(catalog.get("late").unwrap().partitions[0].leader_id, 2);
}

#[test]
fn test_orphan_partition_is_dropped() {
    let segment = SegmentBuilder::new()
        .topic("foo", Uuid::from_u128(1))
        .batch(&[partition_value(&PartitionSpec::new(0, Uuid::from_u128(2), 1))])
        .build();

    let catalog = parse_segment(&segment).unwrap();
    assert_eq!(catalog.topic_count(), 1);
    assert_eq!(catalog.partition_count(), 0);
}

#[test]
fn test_find_topic_by_id() {
    let catalog = parse_segment(&two_topic_segment()).unwrap();
    let bar = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0042);
    let (name, topic) = catalog.find_by_id(bar).unwrap();
    assert_eq!(name, "bar");
    assert_eq!(topic.partitions.len(), 1);
    assert!(catalog.find_by_id(Uuid::nil()).is_none());
}

#[test]
fn test_truncated_segment_is_corrupt() {
    let segment = two_topic_segment();
    for cut in [1, 11, 30, segment.len() / 2, segment.len() - 1] {
        match parse_segment(&segment[..cut]) {
            Err(MetadataError::Corrupt { .. }) => {}
            other => panic!("cut at {}: expected corrupt segment, got {:?}", cut, other),
        }
    }
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&two_topic_segment()).unwrap();

    let catalog = TopicCatalog::load(file.path()).unwrap();
    assert!(catalog.get("foo").is_some());
    assert!(catalog.get("bar").is_some());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        TopicCatalog::load(dir.path().join("missing.log")),
        Err(MetadataError::Io { .. })
    ));
}
