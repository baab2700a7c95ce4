/// Failures that callers may want to tell apart from generic command errors.
///
/// Everything else travels as `anyhow::Error` with context attached.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("{interpreter} cannot create virtual environments ({hint})")]
    MissingCapability { interpreter: String, hint: String },

    #[error("Invalid {name}={value:?}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Step '{step}' failed")]
    StepFailed {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
