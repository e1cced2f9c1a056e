use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::utils::error::FleetError;

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Store-assigned record identifier: 12 bytes rendered as 24 lowercase hex chars.
///
/// Layout follows the usual document-store convention: 4 bytes of seconds since
/// the epoch, 5 random bytes, then a 3-byte counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId([u8; 12]);

impl RecordId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        let secs = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&rand::random::<[u8; 5]>());
        let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn is_valid(value: &str) -> bool {
        value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for RecordId {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(FleetError::InvalidIdentifier {
                value: s.to_string(),
            });
        }
        let mut bytes = [0u8; 12];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| FleetError::InvalidIdentifier {
                value: s.to_string(),
            })?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| {
                FleetError::InvalidIdentifier {
                    value: s.to_string(),
                }
            })?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Available,
    Maintenance,
    Service,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 3] = [
        VehicleStatus::Available,
        VehicleStatus::Maintenance,
        VehicleStatus::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Service => "service",
        }
    }

    /// Comma separated list used in error messages.
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| FleetError::InvalidEnum {
                field: "status".to_string(),
                allowed: Self::allowed(),
            })
    }
}

/// Creation payload as received. Fields stay loosely typed so that type
/// mismatches are reported as validation errors rather than parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

impl VehicleInput {
    pub fn new(mark: &str, model: &str, year: i64) -> Self {
        Self {
            mark: Some(mark.into()),
            model: Some(model.into()),
            year: Some(year.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Body of a status update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusInput {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

/// A creation payload that passed validation: trimmed text, defaulted status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVehicle {
    pub mark: String,
    pub model: String,
    pub year: i32,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub email: String,
}

/// Persisted vehicle document. References hold bare identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDoc {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub mark: String,
    pub model: String,
    pub year: i32,
    pub status: VehicleStatus,
    pub created_by: RecordId,
    #[serde(default)]
    pub updated_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub seq: u64,
}

/// Vehicle as returned to callers, with creator and updater resolved.
/// An unknown user resolves to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleView {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub mark: String,
    pub model: String,
    pub year: i32,
    pub status: VehicleStatus,
    pub created_by: Option<User>,
    pub updated_by: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// `page` and `limit` must already be known to be at least 1.
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }

    pub fn offset(page: u64, limit: u64) -> u64 {
        (page - 1).saturating_mul(limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclePage {
    pub vehicles: Vec<VehicleView>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_roundtrip_and_shape() {
        let id = RecordId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), 24);
        assert!(RecordId::is_valid(&text));
        assert_eq!(text.parse::<RecordId>().unwrap(), id);
    }

    #[test]
    fn test_record_id_rejects_malformed() {
        assert!(matches!(
            "not-an-id".parse::<RecordId>(),
            Err(FleetError::InvalidIdentifier { .. })
        ));
        assert!("zzzzzzzzzzzzzzzzzzzzzzzz".parse::<RecordId>().is_err());
        assert!("65f1c0ffee65f1c0ffee65f1".parse::<RecordId>().is_ok());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("service".parse::<VehicleStatus>().unwrap(), VehicleStatus::Service);
        assert!("Service".parse::<VehicleStatus>().is_err());
        assert_eq!(VehicleStatus::default(), VehicleStatus::Available);
        assert_eq!(VehicleStatus::allowed(), "available, maintenance, service");
    }

    #[test]
    fn test_pagination_math() {
        let first = Pagination::new(1, 10, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let empty = Pagination::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);

        assert_eq!(Pagination::offset(3, 10), 20);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(2, 5, 12)).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["itemsPerPage"], 5);
        assert_eq!(json["hasPrevPage"], true);
    }
}
