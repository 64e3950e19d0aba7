use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use attendance_domain::ports::AttendanceRepository;
use attendance_domain::{now_iso8601, AttendanceRecord, NewAttendanceRecord};

/// Process-local stand-in for the hosted datastore. Used when no
/// `datastore_url` is configured.
#[derive(Default)]
pub struct MemoryAttendanceRepository {
    rows: RwLock<Vec<AttendanceRecord>>,
}

impl MemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl AttendanceRepository for MemoryAttendanceRepository {
    async fn insert(&self, record: &NewAttendanceRecord) -> anyhow::Result<AttendanceRecord> {
        let now = now_iso8601();
        let mut saved = AttendanceRecord::unsaved(record.clone());
        saved.id = Some(Uuid::new_v4().to_string());
        saved.marked_at = Some(now.clone());
        saved.created_at = Some(now);
        self.rows.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.rows.read().await.len() as u64)
    }

    async fn find_by_registration(
        &self,
        event_name: &str,
        registration_number: &str,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| {
                row.registration_number == registration_number
                    && row.event_name.as_deref() == Some(event_name)
            })
            .cloned())
    }
}
