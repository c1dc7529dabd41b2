use std::error::Error;

use tracing::{debug, error, info, warn};

use super::error::ReferralError;
use super::pipeline::Stage;

/// Side-channel sink for pipeline events.
///
/// Nothing reported here ever reaches the HTTP response.
pub trait ReferralObserver: Send + Sync {
    fn received(&self, description: &str);

    fn prompt_rendered(&self, prompt: &str);

    fn responded(&self, referral: &str);

    /// `stage` is `None` when the failure happened outside the stage machine
    /// (for example a panicked request task).
    fn failed(&self, stage: Option<Stage>, error: &ReferralError);
}

/// Emits pipeline events as `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReferralObserver for TracingObserver {
    fn received(&self, description: &str) {
        info!(description, "received referral request");
    }

    fn prompt_rendered(&self, prompt: &str) {
        debug!(prompt, "sending prompt to model");
    }

    fn responded(&self, referral: &str) {
        info!(referral, "model response sanitized");
    }

    fn failed(&self, stage: Option<Stage>, err: &ReferralError) {
        let stage = stage.map(Stage::as_str).unwrap_or("unknown");
        match err {
            ReferralError::Validation(_) => warn!(stage, error = %err, "rejected referral request"),
            ReferralError::ModelInvocation(_) => {
                error!(stage, error = %err, cause = %error_chain(err), "model invocation failed")
            }
            ReferralError::Unexpected(_) => {
                error!(stage, error = %err, "unexpected failure while handling referral request")
            }
        }
    }
}

/// Joins an error's source chain into one line, outermost first.
pub fn error_chain(err: &dyn Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeError;

    #[test]
    fn error_chain_walks_sources() {
        let err = ReferralError::from(BridgeError::ModelNotFound {
            model: "qwen:1.8b".into(),
        });
        assert_eq!(
            error_chain(&err),
            "model invocation failed: model \"qwen:1.8b\" is not available on the inference runtime"
        );
    }

    #[test]
    fn error_chain_without_source_is_display() {
        let err = ReferralError::empty_input();
        assert_eq!(error_chain(&err), "validation failed: empty input");
    }
}
