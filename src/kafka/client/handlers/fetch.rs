use log::info;

use crate::kafka::messages::{FetchRequest, FetchResponse};
use crate::metadata::TopicCatalog;

/// Fetch is answered with an empty response; no log data is served and no
/// fetch session is created.
pub(crate) fn handle_fetch(catalog: &TopicCatalog, request: &FetchRequest) -> FetchResponse {
    for topic in &request.topics {
        let name = catalog.find_by_id(topic.topic_id).map(|(name, _)| name);
        info!(
            "Fetch for topic {} ({:?}), {} partitions",
            topic.topic_id,
            name,
            topic.partitions.len()
        );
    }

    FetchResponse {
        throttle_time_ms: 0,
        error_code: 0,
        session_id: 0,
    }
}
