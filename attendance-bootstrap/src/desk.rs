use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use attendance_application::commands::RegistrationForm;
use attendance_application::ops::ScanError;
use attendance_application::{AppError, AppState};
use attendance_infrastructure::{ImageFileCamera, QrFrameDecoder, StaticIdentityProvider};

/// Issues one credential and keeps it in the credential directory.
pub async fn issue_credential(
    state: &AppState,
    name: &str,
    registration_number: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut issuer = state.issuer();
    let issued = issuer
        .submit(&RegistrationForm::new(name, registration_number), cancel)
        .await?;
    info!("credential payload: {}", issued.payload_text);
    let location = issuer.retain().await?;
    Ok(location)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeskSummary {
    pub scanned: usize,
    pub marked: usize,
    pub failed: usize,
}

/// Runs a scanner desk over image files until they run out or `cancel`
/// fires.
pub async fn run_scanner_desk(
    state: &AppState,
    source: PathBuf,
    identity: StaticIdentityProvider,
    cancel: &CancellationToken,
) -> Result<DeskSummary> {
    let mut desk = state.scanner_desk(
        Arc::new(ImageFileCamera::new(source)),
        Arc::new(QrFrameDecoder::new()),
        Arc::new(identity),
    );
    let mut summary = DeskSummary::default();

    let status = desk.open(cancel).await?;
    info!("scanner desk open: datastore={}", status.as_str());

    loop {
        let payload = match desk.scan(cancel).await {
            Ok(payload) => payload,
            Err(AppError::Scan(ScanError::StreamEnded | ScanError::Cancelled)) => break,
            Err(err) => {
                desk.close();
                return Err(err.into());
            }
        };
        summary.scanned += 1;
        info!(
            "scanned: registration_number={}, name={}",
            payload.registration_number, payload.name
        );

        match desk.confirm(cancel).await {
            Ok(record) => {
                summary.marked += 1;
                info!(
                    "attendance recorded: registration_number={}, volunteer={}",
                    record.registration_number, record.marked_by_volunteer
                );
            }
            Err(err) => {
                summary.failed += 1;
                warn!("attendance not recorded: {}", err);
                // No operator to retry from the command line.
                desk.scan_another().await?;
            }
        }
    }

    desk.close();
    Ok(summary)
}
