use std::sync::Arc;

use super::error::{ReferralError, ValidationFailure};
use super::observer::ReferralObserver;
use super::prompt::PromptTemplate;
use super::sanitize::strip_reasoning;
use super::validate::validate;
use crate::bridge::InferenceRuntime;

/// Where a request is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validating,
    Prompting,
    Invoking,
    Sanitizing,
    Responded,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Prompting => "prompting",
            Self::Invoking => "invoking",
            Self::Sanitizing => "sanitizing",
            Self::Responded => "responded",
        }
    }
}

/// Sanitized model answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referral(String);

impl Referral {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Validate, render, invoke, sanitize. One instance serves every request;
/// it holds no per-request state.
pub struct ReferralPipeline {
    template: PromptTemplate,
    runtime: Arc<dyn InferenceRuntime>,
    observer: Arc<dyn ReferralObserver>,
}

impl ReferralPipeline {
    pub fn new(
        template: PromptTemplate,
        runtime: Arc<dyn InferenceRuntime>,
        observer: Arc<dyn ReferralObserver>,
    ) -> Self {
        Self {
            template,
            runtime,
            observer,
        }
    }

    pub fn model(&self) -> &str {
        self.runtime.model()
    }

    /// Reports a request whose body could not be decoded. It is logged like
    /// any other request: receipt first, then the validation failure.
    pub fn reject_malformed(&self) -> ReferralError {
        let err = ReferralError::Validation(ValidationFailure::MalformedBody);
        self.observer.received("");
        self.observer.failed(Some(Stage::Validating), &err);
        err
    }

    /// Runs one request to completion. A failure at any stage ends the
    /// request; nothing produced before it is returned.
    pub async fn run(&self, description: Option<&str>) -> Result<Referral, ReferralError> {
        let mut stage = Stage::Received;
        self.observer.received(description.unwrap_or_default());

        let result = self.advance(description, &mut stage).await;
        match &result {
            Ok(referral) => self.observer.responded(referral.as_str()),
            Err(err) => self.observer.failed(Some(stage), err),
        }
        result
    }

    /// Runs the request on its own task so a panic inside the pipeline is
    /// reported as [`ReferralError::Unexpected`] instead of dropping the
    /// connection.
    pub async fn handle(
        self: &Arc<Self>,
        description: Option<String>,
    ) -> Result<Referral, ReferralError> {
        let pipeline = Arc::clone(self);
        let task = tokio::spawn(async move { pipeline.run(description.as_deref()).await });

        match task.await {
            Ok(result) => result,
            Err(join_err) => {
                let err = ReferralError::Unexpected(join_err.to_string());
                self.observer.failed(None, &err);
                Err(err)
            }
        }
    }

    async fn advance(
        &self,
        description: Option<&str>,
        stage: &mut Stage,
    ) -> Result<Referral, ReferralError> {
        *stage = Stage::Validating;
        let description = validate(description)?;

        *stage = Stage::Prompting;
        let prompt = self.template.render(description);
        self.observer.prompt_rendered(prompt.as_str());

        *stage = Stage::Invoking;
        let raw = self.runtime.chat(prompt.as_str()).await?;

        *stage = Stage::Sanitizing;
        let referral = Referral(strip_reasoning(&raw));

        *stage = Stage::Responded;
        Ok(referral)
    }
}
