use kafka_protocol::error::ResponseError;
use log::{debug, warn};
use uuid::Uuid;

use crate::kafka::messages::{
    DescribeTopicPartitionsRequest, DescribeTopicPartitionsResponse, ResponsePartition, ResponseTopic,
    TOPIC_AUTHORIZED_OPERATIONS,
};
use crate::metadata::{Partition, TopicCatalog};

/// Answers each requested topic from the catalog, in request order.
///
/// The partition limit and cursor are accepted but pagination is not
/// performed; `next_cursor` is always null.
pub(crate) fn handle_describe_topic_partitions(
    catalog: &TopicCatalog,
    request: &DescribeTopicPartitionsRequest,
) -> DescribeTopicPartitionsResponse {
    debug!(
        "DescribeTopicPartitions: topics={:?}, partition_limit={}, cursor={:?}",
        request.topics, request.response_partition_limit, request.cursor
    );

    let topics = request
        .topics
        .iter()
        .map(|name| describe_topic(catalog, name))
        .collect();

    DescribeTopicPartitionsResponse {
        throttle_time_ms: 0,
        topics,
        next_cursor: None,
    }
}

fn describe_topic(catalog: &TopicCatalog, name: &str) -> ResponseTopic {
    match catalog.describe(name) {
        Ok(topic) => ResponseTopic {
            error_code: topic.error_code,
            name: name.to_string(),
            topic_id: topic.id,
            is_internal: false,
            partitions: topic.partitions.iter().map(response_partition).collect(),
            topic_authorized_operations: TOPIC_AUTHORIZED_OPERATIONS,
        },
        Err(e) => {
            warn!("{}", e);
            ResponseTopic {
                error_code: ResponseError::UnknownTopicOrPartition.code(),
                name: name.to_string(),
                topic_id: Uuid::nil(),
                is_internal: false,
                partitions: Vec::new(),
                topic_authorized_operations: TOPIC_AUTHORIZED_OPERATIONS,
            }
        }
    }
}

fn response_partition(partition: &Partition) -> ResponsePartition {
    ResponsePartition {
        error_code: partition.error_code,
        partition_index: partition.partition_index,
        leader_id: partition.leader_id,
        leader_epoch: partition.leader_epoch,
        replica_nodes: partition.replica_ids.clone(),
        isr_nodes: partition.in_sync_replica_ids.clone(),
        eligible_leader_replicas: partition.eligible_leader_replica_ids.clone(),
        last_known_elr: partition.last_known_elr_ids.clone(),
        offline_replicas: partition.offline_replica_ids.clone(),
    }
}
