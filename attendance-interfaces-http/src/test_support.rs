use std::sync::Arc;

use attendance_application::AppState;
use attendance_domain::ports::AttendanceRepository;
use attendance_infrastructure::{
    AppConfig, CredentialFileArchive, MemoryAttendanceRepository, QrCredentialRenderer,
};

pub fn state_with(repo: Arc<dyn AttendanceRepository>, credential_dir: &std::path::Path) -> AppState {
    let runtime = AppConfig::default()
        .to_runtime_config()
        .expect("default config");
    AppState::new(
        runtime,
        repo,
        Arc::new(QrCredentialRenderer::new()),
        Arc::new(CredentialFileArchive::new(credential_dir)),
    )
}

pub fn memory_state(credential_dir: &std::path::Path) -> (AppState, Arc<MemoryAttendanceRepository>) {
    let repo = Arc::new(MemoryAttendanceRepository::new());
    (state_with(repo.clone(), credential_dir), repo)
}
