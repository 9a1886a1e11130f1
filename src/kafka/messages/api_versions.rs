use bytes::{BufMut, Bytes, BytesMut};

use super::{RequestBody, ResponseBody};
use crate::protocol::{KafkaBuf, KafkaBufMut, ProtocolError};

/// First version using compact strings, compact arrays and tagged fields.
const FIRST_FLEXIBLE_VERSION: i16 = 3;

/// Versions before 3 carry no body; the software fields are then `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersionsRequest {
    pub client_software_name: Option<String>,
    pub client_software_version: Option<String>,
}

impl RequestBody for ApiVersionsRequest {
    fn decode(buf: &mut Bytes, version: i16) -> Result<Self, ProtocolError> {
        if version < FIRST_FLEXIBLE_VERSION {
            return Ok(Self::default());
        }
        let client_software_name = buf.read_compact_string()?;
        let client_software_version = buf.read_compact_string()?;
        buf.skip_tagged_fields()?;

        Ok(Self {
            client_software_name: Some(client_software_name),
            client_software_version: Some(client_software_version),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersionRange {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

impl ApiVersionRange {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.api_key);
        buf.put_i16(self.min_version);
        buf.put_i16(self.max_version);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub error_code: i16,
    pub api_keys: Vec<ApiVersionRange>,
    pub throttle_time_ms: i32,
}

impl ResponseBody for ApiVersionsResponse {
    fn encode(&self, buf: &mut BytesMut, version: i16) {
        buf.put_i16(self.error_code);
        if version >= FIRST_FLEXIBLE_VERSION {
            buf.put_compact_array(&self.api_keys, |buf, api| {
                api.encode(buf);
                buf.put_empty_tagged_fields();
            });
            buf.put_i32(self.throttle_time_ms);
            buf.put_empty_tagged_fields();
        } else {
            buf.put_array(&self.api_keys, |buf, api| api.encode(buf));
            if version >= 1 {
                buf.put_i32(self.throttle_time_ms);
            }
        }
    }
}
