use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use attendance_application::AppState;
use attendance_domain::ports::AttendanceRepository;
use attendance_infrastructure::{
    AppConfig, CredentialFileArchive, MemoryAttendanceRepository, PostgrestAttendanceRepository,
    QrCredentialRenderer,
};

pub struct AppContext {
    pub config: AppConfig,
    pub state: AppState,
}

impl AppContext {
    pub async fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
        match config_path {
            Some(path) => AppConfig::load_from(path).await,
            None => AppConfig::load().await,
        }
    }

    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config()?;
        let datastore_config = config.to_datastore_config();

        let repo: Arc<dyn AttendanceRepository> = if datastore_config.datastore_url.is_some() {
            let repo = PostgrestAttendanceRepository::new(&datastore_config)?;
            info!(
                "using hosted datastore: {}",
                datastore_config.datastore_url.as_deref().unwrap_or_default()
            );
            Arc::new(repo)
        } else {
            warn!("datastore_url not set, attendance is kept in memory only");
            Arc::new(MemoryAttendanceRepository::new())
        };

        let archive = Arc::new(CredentialFileArchive::new(&runtime_config.credential_dir));
        let state = AppState::new(
            runtime_config,
            repo,
            Arc::new(QrCredentialRenderer::new()),
            archive,
        );

        Ok(Self { config, state })
    }
}
