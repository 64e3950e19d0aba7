use std::sync::Arc;

use attendance_domain::ports::{CredentialArchive, CredentialRenderer};
use attendance_domain::{
    credential_file_name, encode_payload_text, now_iso8601, IdentityPayload, RenderStyle,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::Metrics;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("{field} is required")]
    Validation { field: &'static str },
    #[error("credential generation was cancelled")]
    Cancelled,
    #[error("no credential has been generated yet")]
    NothingToRetain,
    #[error("failed to generate credential: {0}")]
    Encode(String),
    #[error("failed to save credential: {0}")]
    Retain(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    #[serde(alias = "registrationNumber")]
    pub registration_number: String,
}

impl RegistrationForm {
    pub fn new(name: impl Into<String>, registration_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registration_number: registration_number.into(),
        }
    }

    fn validate(&self) -> Result<(), IssueError> {
        if self.name.trim().is_empty() {
            return Err(IssueError::Validation { field: "name" });
        }
        if self.registration_number.trim().is_empty() {
            return Err(IssueError::Validation {
                field: "registrationNumber",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub payload: IdentityPayload,
    /// Exact text embedded in the image.
    pub payload_text: String,
    pub png: Vec<u8>,
    pub file_name: String,
}

/// Participant-side flow: form in, credential image out.
///
/// Holds at most one generated credential. Taking `&mut self` for submission
/// is what keeps a second submission from starting while an encode is still
/// running.
pub struct CredentialIssuer {
    renderer: Arc<dyn CredentialRenderer>,
    archive: Arc<dyn CredentialArchive>,
    event_name: String,
    file_prefix: String,
    style: RenderStyle,
    metrics: Arc<Metrics>,
    current: Option<IssuedCredential>,
}

impl CredentialIssuer {
    pub fn new(
        renderer: Arc<dyn CredentialRenderer>,
        archive: Arc<dyn CredentialArchive>,
        event_name: String,
        file_prefix: String,
        style: RenderStyle,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            renderer,
            archive,
            event_name,
            file_prefix,
            style,
            metrics,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&IssuedCredential> {
        self.current.as_ref()
    }

    pub async fn submit(
        &mut self,
        form: &RegistrationForm,
        cancel: &CancellationToken,
    ) -> Result<&IssuedCredential, IssueError> {
        form.validate()?;

        let payload = IdentityPayload::new(
            form.registration_number.clone(),
            form.name.clone(),
            self.event_name.clone(),
            now_iso8601(),
        );
        let payload_text =
            encode_payload_text(&payload).map_err(|err| IssueError::Encode(err.to_string()))?;

        let renderer = self.renderer.clone();
        let style = self.style;
        let text = payload_text.clone();
        let job = tokio::task::spawn_blocking(move || renderer.render(&text, &style));

        let png = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(IssueError::Cancelled),
            joined = job => joined
                .map_err(|err| IssueError::Encode(err.to_string()))?
                .map_err(|err| {
                    error!("credential rendering failed: {}", err);
                    IssueError::Encode(err.to_string())
                })?,
        };

        let file_name = credential_file_name(&self.file_prefix, &payload.registration_number);
        info!(
            "credential issued: registration_number={}, bytes={}",
            payload.registration_number,
            png.len()
        );
        self.metrics.record_credential_issued();

        Ok(&*self.current.insert(IssuedCredential {
            payload,
            payload_text,
            png,
            file_name,
        }))
    }

    /// Saves the current image under its deterministic file name.
    pub async fn retain(&self) -> Result<String, IssueError> {
        let credential = self.current.as_ref().ok_or(IssueError::NothingToRetain)?;
        self.archive
            .retain(&credential.file_name, &credential.png)
            .await
            .map_err(|err| IssueError::Retain(err.to_string()))
    }

    /// Back to the empty form. Already-saved images are untouched.
    pub fn generate_another(&mut self) {
        self.current = None;
    }
}
