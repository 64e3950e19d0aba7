use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    credentials_issued: AtomicU64,
    scans_decoded: AtomicU64,
    scans_rejected: AtomicU64,
    attendance_marked: AtomicU64,
    attendance_errors: AtomicU64,
}

impl Metrics {
    pub fn record_credential_issued(&self) {
        self.credentials_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_decoded(&self) {
        self.scans_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_rejected(&self) {
        self.scans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attendance(&self) {
        self.attendance_marked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attendance_error(&self) {
        self.attendance_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn attendance_marked(&self) -> u64 {
        self.attendance_marked.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let issued = self.credentials_issued.load(Ordering::Relaxed);
        let decoded = self.scans_decoded.load(Ordering::Relaxed);
        let rejected = self.scans_rejected.load(Ordering::Relaxed);
        let marked = self.attendance_marked.load(Ordering::Relaxed);
        let errors = self.attendance_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE attendance_credentials_issued_total counter\n\
attendance_credentials_issued_total {}\n\
# TYPE attendance_scans_decoded_total counter\n\
attendance_scans_decoded_total {}\n\
# TYPE attendance_scans_rejected_total counter\n\
attendance_scans_rejected_total {}\n\
# TYPE attendance_marked_total counter\n\
attendance_marked_total {}\n\
# TYPE attendance_mark_errors_total counter\n\
attendance_mark_errors_total {}\n",
            issued, decoded, rejected, marked, errors
        )
    }
}
