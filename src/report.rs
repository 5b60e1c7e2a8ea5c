// src/report.rs

//! Mapping a [`DetectResponse`] onto a build-step outcome.

use tracing::error;

use crate::buildlog::JobLogger;
use crate::errors::DetectError;
use crate::types::DetectResponse;

/// Exit codes used by the step itself, as opposed to codes passed through
/// from Detect.
pub mod codes {
    pub const SUCCESS: i32 = 0;

    /// Invalid configuration or missing required environment.
    pub const CONFIG: i32 = 2;

    /// The run could not be completed (spawn failure, interruption, ...).
    pub const INTERNAL_ERROR: i32 = 70;
}

/// Exit code for errors raised before a run could start.
pub fn exit_code_for_error(err: &DetectError) -> i32 {
    match err {
        DetectError::ConfigError(_)
        | DetectError::MissingEnvironment(_)
        | DetectError::TomlError(_) => codes::CONFIG,
        _ => codes::INTERNAL_ERROR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Success,
    /// Detect ran and exited non-zero.
    ToolFailure,
    /// Detect could not be run to completion.
    InternalError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub exit_code: i32,
    pub kind: StepKind,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        self.kind == StepKind::Success
    }
}

#[derive(Debug, Clone)]
pub struct ResultReporter {
    logger: JobLogger,
}

impl ResultReporter {
    pub fn new(logger: JobLogger) -> Self {
        Self { logger }
    }

    /// Exceptional responses are logged here, once, with their causes.
    /// Exit codes are passed through untouched and not logged as errors.
    pub fn report(&self, response: &DetectResponse) -> StepOutcome {
        match response {
            DetectResponse::Success { exit_code } => StepOutcome {
                exit_code: *exit_code,
                kind: StepKind::Success,
            },
            DetectResponse::Failure { exit_code } => StepOutcome {
                exit_code: *exit_code,
                kind: StepKind::ToolFailure,
            },
            DetectResponse::Exceptional { error: detail } => {
                error!(error = %detail, "Detect step failed with an internal error");
                self.logger.error_chain(
                    format!("Detect failed with an internal error: {}", detail.message),
                    &detail.causes,
                );
                StepOutcome {
                    exit_code: codes::INTERNAL_ERROR,
                    kind: StepKind::InternalError,
                }
            }
        }
    }
}
