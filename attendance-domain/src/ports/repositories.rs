use async_trait::async_trait;

use crate::entities::{AttendanceRecord, NewAttendanceRecord};

pub const ATTENDANCE_COLLECTION: &str = "attendance_records";

/// The hosted datastore's `attendance_records` collection.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Appends one row and returns it with server-assigned fields filled in.
    async fn insert(&self, record: &NewAttendanceRecord) -> anyhow::Result<AttendanceRecord>;
    /// Existence probe; callers only care whether it succeeds.
    async fn count(&self) -> anyhow::Result<u64>;
    async fn find_by_registration(
        &self,
        event_name: &str,
        registration_number: &str,
    ) -> anyhow::Result<Option<AttendanceRecord>>;
}

/// Where issued credential images are kept for the participant to take away.
#[async_trait]
pub trait CredentialArchive: Send + Sync {
    /// Stores `bytes` under `file_name` and returns the resulting location.
    async fn retain(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<String>;
}
