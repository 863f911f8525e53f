//! Device registry data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::registry::error::{StoreError, StoreResult};

/// Globally unique identity of a device: unique per tenant, not across tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceKey {
    pub tenant: String,
    pub name: String,
}

impl DeviceKey {
    pub fn new(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            name: name.into(),
        }
    }

    /// Reject keys with an empty tenant or name.
    pub fn validate(&self) -> StoreResult<()> {
        if self.tenant.trim().is_empty() {
            return Err(StoreError::InvalidKey("tenant must not be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidKey("device name must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant, self.name)
    }
}

/// Stored representation of one managed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Tenant the device belongs to.
    pub tenant: String,

    /// Device name, unique within the tenant.
    pub name: String,

    /// Free-form tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Control-plane address the device reports to (device-agent side only).
    #[serde(default)]
    pub control_plane: Option<String>,

    /// Set by the store on create.
    #[serde(with = "unix_millis")]
    pub created_at: SystemTime,

    /// Set by the store on every write, never decreases.
    #[serde(with = "unix_millis")]
    pub modified_at: SystemTime,
}

impl DeviceRecord {
    /// Create an unsaved record. Timestamps are placeholders until the store stamps them.
    pub fn new(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            name: name.into(),
            tags: BTreeMap::new(),
            control_plane: None,
            created_at: UNIX_EPOCH,
            modified_at: UNIX_EPOCH,
        }
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_control_plane(mut self, address: impl Into<String>) -> Self {
        self.control_plane = Some(address.into());
        self
    }

    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.tenant.clone(), self.name.clone())
    }

    /// True when both records carry the same identity and mutable attributes,
    /// ignoring store-stamped timestamps.
    pub fn same_content(&self, other: &DeviceRecord) -> bool {
        self.tenant == other.tenant
            && self.name == other.name
            && self.tags == other.tags
            && self.control_plane == other.control_plane
    }
}

/// Opaque continuation token for [`RegistryStore::list`](crate::registry::RegistryStore::list).
///
/// Encodes the last device name of the previous page as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub(crate) fn after(name: &str) -> Self {
        let mut encoded = String::with_capacity(name.len() * 2);
        for byte in name.as_bytes() {
            encoded.push_str(&format!("{:02x}", byte));
        }
        Self(encoded)
    }

    /// Parse a token received from a caller.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let token = Self(raw.to_string());
        token.last_name()?;
        Ok(token)
    }

    /// Decode the device name this token continues after.
    pub(crate) fn last_name(&self) -> StoreResult<String> {
        let invalid = || StoreError::InvalidPageToken(self.0.clone());
        if self.0.is_empty() || self.0.len() % 2 != 0 {
            return Err(invalid());
        }
        // Lowercase hex only, so each position has exactly one token.
        let nibble = |c: u8| match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            _ => None,
        };
        let bytes = self
            .0
            .as_bytes()
            .chunks(2)
            .map(|pair| match (nibble(pair[0]), nibble(pair[1])) {
                (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
                _ => Err(invalid()),
            })
            .collect::<StoreResult<Vec<u8>>>()?;
        String::from_utf8(bytes).map_err(|_| invalid())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a tenant listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub records: Vec<DeviceRecord>,

    /// Present when more records may follow.
    pub next_page_token: Option<PageToken>,
}

/// Serde adapter storing `SystemTime` as milliseconds since the Unix epoch.
pub mod unix_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn to_millis(time: &SystemTime) -> u64 {
        time.duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(to_millis(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_millis(millis))
    }
}
