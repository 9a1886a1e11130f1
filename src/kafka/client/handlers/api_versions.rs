use kafka_protocol::messages::ApiKey;
use log::debug;

use crate::kafka::messages::{ApiVersionRange, ApiVersionsRequest, ApiVersionsResponse};
use crate::kafka::protocol::FETCH_VERSION;

/// Capability table advertised in every ApiVersions response.
pub const SUPPORTED_API_VERSIONS: &[ApiVersionRange] = &[
    ApiVersionRange {
        api_key: ApiKey::Fetch as i16,
        min_version: FETCH_VERSION,
        max_version: FETCH_VERSION,
    },
    ApiVersionRange {
        api_key: ApiKey::ApiVersions as i16,
        min_version: 0,
        max_version: 4,
    },
    ApiVersionRange {
        api_key: ApiKey::DescribeTopicPartitions as i16,
        min_version: 0,
        max_version: 0,
    },
];

pub(crate) fn handle_api_versions(request: &ApiVersionsRequest) -> ApiVersionsResponse {
    debug!(
        "ApiVersions from client software {:?} {:?}",
        request.client_software_name, request.client_software_version
    );

    ApiVersionsResponse {
        error_code: 0,
        api_keys: SUPPORTED_API_VERSIONS.to_vec(),
        throttle_time_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::protocol::SUPPORTED_VERSIONS;

    fn advertised(api_key: ApiKey) -> ApiVersionRange {
        *SUPPORTED_API_VERSIONS
            .iter()
            .find(|range| range.api_key == api_key as i16)
            .unwrap()
    }

    #[test]
    fn test_fetch_range_matches_decoded_version() {
        let fetch = advertised(ApiKey::Fetch);
        assert_eq!((fetch.min_version, fetch.max_version), (16, 16));
    }

    #[test]
    fn test_advertised_ranges_are_served() {
        let api_versions = advertised(ApiKey::ApiVersions);
        assert!(SUPPORTED_VERSIONS.contains(&api_versions.min_version));
        assert!(SUPPORTED_VERSIONS.contains(&api_versions.max_version));

        let describe = advertised(ApiKey::DescribeTopicPartitions);
        assert!(SUPPORTED_VERSIONS.contains(&describe.min_version));
        assert!(SUPPORTED_VERSIONS.contains(&describe.max_version));
    }
}
