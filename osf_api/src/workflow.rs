//! Preprint creation workflow.
//!
//! The service refuses to publish a preprint that has no primary file, and a
//! file can only be uploaded into a preprint that already exists. Creating a
//! published preprint is therefore four requests in a fixed order:
//!
//! 1. create an unpublished draft under the chosen provider,
//! 2. upload the primary file into the draft's storage,
//! 3. point the draft's `primary_file` relationship at the upload,
//! 4. if publication was requested, set `is_published`.
//!
//! Nothing is retried or rolled back. A failure at any stage reports the ids
//! produced so far so the caller can clean up or resume by hand.

use std::{fmt, future::Future, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    envelope::{Relationship, Relationships},
    errors::DecodeError,
    services::{normalize_file_id, Upload},
    types::{FileID, Preprint, PreprintID, PreprintInput, TYPE_FILES},
    Client, Error,
};

/// A step of the creation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Create,
    Upload,
    Patch,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Stage::Create => "create",
                Stage::Upload => "upload",
                Stage::Patch => "patch",
                Stage::Publish => "publish",
            }
        )
    }
}

/// A stage failed. Carries whatever the earlier stages produced.
#[derive(thiserror::Error, Debug)]
#[error("preprint creation failed at the {stage} stage: {source}")]
pub struct CreationError {
    pub stage: Stage,
    /// Id of the draft, once stage 1 succeeded.
    pub preprint_id: Option<PreprintID>,
    /// Normalized id of the uploaded file, once stage 2 succeeded.
    pub file_id: Option<FileID>,
    #[source]
    pub source: Error,
}

impl CreationError {
    /// True when the failure happened before anything existed remotely.
    pub fn created_nothing(&self) -> bool {
        self.preprint_id.is_none()
    }
}

/// Result of a completed workflow.
#[derive(Debug, Clone)]
pub struct Created {
    pub preprint: Preprint,
    pub file_id: FileID,
    /// Last stage that ran: [`Stage::Patch`], or [`Stage::Publish`] when
    /// publication was requested.
    pub stage: Stage,
}

enum State {
    DraftRequested {
        upload: Upload,
    },
    DraftCreated {
        preprint_id: PreprintID,
        upload: Upload,
    },
    FileUploaded {
        preprint_id: PreprintID,
        file_id: FileID,
    },
    RelationshipPatched {
        preprint: Preprint,
        file_id: FileID,
    },
    Published {
        preprint: Preprint,
        file_id: FileID,
    },
}

/// Pending run of the workflow, returned by
/// [`Preprints::create`](crate::services::Preprints::create).
pub struct CreatePreprint<'a> {
    client: &'a Client,
    input: PreprintInput,
    upload: Upload,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl<'a> CreatePreprint<'a> {
    pub(crate) fn new(client: &'a Client, input: PreprintInput, upload: Upload) -> Self {
        Self {
            client,
            input,
            upload,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Stops at the current stage once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Stops at the current stage once `deadline` passes.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stops at the current stage once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Runs the stages in order.
    pub async fn run(self) -> Result<Created, CreationError> {
        let CreatePreprint {
            client,
            mut input,
            upload,
            cancel,
            deadline,
        } = self;
        let signals = Signals { cancel, deadline };

        // The service rejects publish-on-create without a primary file.
        let publish = input.is_published.take().unwrap_or(false);

        let mut state = State::DraftRequested { upload };
        loop {
            state = match state {
                State::DraftRequested { upload } => {
                    let preprint_id = signals
                        .guard(Stage::Create, None, None, create_draft(client, &input))
                        .await?;
                    tracing::info!("Created draft preprint {}", preprint_id);
                    State::DraftCreated {
                        preprint_id,
                        upload,
                    }
                }
                State::DraftCreated {
                    preprint_id,
                    upload,
                } => {
                    let file_id = signals
                        .guard(
                            Stage::Upload,
                            Some(preprint_id.as_str()),
                            None,
                            upload_primary_file(client, &preprint_id, upload),
                        )
                        .await?;
                    tracing::info!("Uploaded primary file {} for {}", file_id, preprint_id);
                    State::FileUploaded {
                        preprint_id,
                        file_id,
                    }
                }
                State::FileUploaded {
                    preprint_id,
                    file_id,
                } => {
                    let preprint = signals
                        .guard(
                            Stage::Patch,
                            Some(preprint_id.as_str()),
                            Some(file_id.as_str()),
                            attach_primary_file(client, &preprint_id, &file_id),
                        )
                        .await?;
                    State::RelationshipPatched { preprint, file_id }
                }
                State::RelationshipPatched { preprint, file_id } if publish => {
                    let preprint = signals
                        .guard(
                            Stage::Publish,
                            Some(preprint.id.as_str()),
                            Some(file_id.as_str()),
                            publish_preprint(client, &preprint.id),
                        )
                        .await?;
                    tracing::info!("Published preprint {}", preprint.id);
                    State::Published { preprint, file_id }
                }
                State::RelationshipPatched { preprint, file_id } => {
                    return Ok(Created {
                        preprint,
                        file_id,
                        stage: Stage::Patch,
                    })
                }
                State::Published { preprint, file_id } => {
                    return Ok(Created {
                        preprint,
                        file_id,
                        stage: Stage::Publish,
                    })
                }
            };
        }
    }
}

/// External stop signals every stage races against.
struct Signals {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Signals {
    async fn guard<T>(
        &self,
        stage: Stage,
        preprint_id: Option<&str>,
        file_id: Option<&str>,
        step: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, CreationError> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = deadline => Err(Error::Cancelled),
            result = step => result,
        };
        result.map_err(|source| {
            if let Some(id) = preprint_id {
                tracing::warn!(
                    "Preprint {} left unfinished after {} stage failed: {}",
                    id,
                    stage,
                    source
                );
            }
            CreationError {
                stage,
                preprint_id: preprint_id.map(str::to_string),
                file_id: file_id.map(str::to_string),
                source,
            }
        })
    }
}

async fn create_draft(client: &Client, input: &PreprintInput) -> Result<PreprintID, Error> {
    let created = client.preprints().create_draft(input).await?;
    let id = created.resource.id.ok_or(DecodeError::MissingId)?;
    Ok(id)
}

async fn upload_primary_file(
    client: &Client,
    preprint_id: &str,
    upload: Upload,
) -> Result<FileID, Error> {
    let uploaded = client.files().upload(preprint_id, upload).await?;
    let id = uploaded.resource.id.ok_or(DecodeError::MissingId)?;
    Ok(normalize_file_id(&id).to_string())
}

async fn attach_primary_file(
    client: &Client,
    preprint_id: &str,
    file_id: &str,
) -> Result<Preprint, Error> {
    let mut relationships = Relationships::new();
    relationships.insert(
        "primary_file".to_string(),
        Relationship::to_one(TYPE_FILES, file_id),
    );
    let patched = client
        .preprints()
        .update(preprint_id, None, Some(&relationships))
        .await?;
    Ok(patched.data)
}

async fn publish_preprint(client: &Client, preprint_id: &str) -> Result<Preprint, Error> {
    let input = PreprintInput {
        is_published: Some(true),
        ..Default::default()
    };
    let published = client
        .preprints()
        .update(preprint_id, Some(&input), None)
        .await?;
    Ok(published.data)
}
