//! In-memory topic catalog rebuilt from the cluster metadata log.
//!
//! The catalog is constructed once at startup by [`TopicCatalog::load`] and
//! shared read-only with every connection afterwards.

mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use thiserror::Error;
use uuid::Uuid;

pub use parser::parse_segment;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to read metadata log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata log corrupt at byte {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },

    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

/// Placement facts for one partition of one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_ids: Vec<i32>,
    pub in_sync_replica_ids: Vec<i32>,
    pub eligible_leader_replica_ids: Vec<i32>,
    pub last_known_elr_ids: Vec<i32>,
    pub offline_replica_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub error_code: i16,
    pub id: Uuid,
    /// In the order the partition records appeared in the log.
    pub partitions: Vec<Partition>,
}

impl Topic {
    pub fn new(id: Uuid) -> Self {
        Self {
            error_code: 0,
            id,
            partitions: Vec::new(),
        }
    }
}

/// Topics keyed by name, iterated in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: IndexMap<String, Topic>,
}

impl TopicCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the whole segment file into memory and parses it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let segment = fs::read(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes of metadata log from {}", segment.len(), path.display());

        let catalog = parse_segment(&segment)?;
        info!(
            "Loaded {} topics with {} partitions from {}",
            catalog.topic_count(),
            catalog.partition_count(),
            path.display()
        );
        Ok(catalog)
    }

    /// Registers a topic, replacing the id of an existing entry with the same name.
    pub fn insert_topic(&mut self, name: impl Into<String>, id: Uuid) {
        self.topics.insert(name.into(), Topic::new(id));
    }

    /// Appends `partition` to the topic whose id is `topic_id`.
    ///
    /// Returns `false` and drops the partition when no such topic exists.
    pub fn attach_partition(&mut self, topic_id: Uuid, partition: Partition) -> bool {
        match self.topics.values_mut().find(|topic| topic.id == topic_id) {
            Some(topic) => {
                topic.partitions.push(partition);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.topics.get(name)
    }

    pub fn describe(&self, name: &str) -> Result<&Topic, MetadataError> {
        self.get(name)
            .ok_or_else(|| MetadataError::UnknownTopic(name.to_string()))
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<(&str, &Topic)> {
        self.topics
            .iter()
            .find(|(_, topic)| topic.id == id)
            .map(|(name, topic)| (name.as_str(), topic))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Topic)> {
        self.topics.iter().map(|(name, topic)| (name.as_str(), topic))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn partition_count(&self) -> usize {
        self.topics.values().map(|topic| topic.partitions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
