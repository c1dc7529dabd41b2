//! Symptom description in, specialist referral out.
//!
//! [`ReferralPipeline`] chains the stages: [`validate`] rejects blank input,
//! [`PromptTemplate`] renders the instruction prompt, the injected
//! [`InferenceRuntime`](crate::bridge::InferenceRuntime) produces raw text, and
//! [`strip_reasoning`] cleans it up. Events go to a [`ReferralObserver`].

mod error;
mod observer;
mod pipeline;
mod prompt;
mod sanitize;
mod validate;

pub use error::{ReferralError, ValidationFailure};
pub use observer::{ReferralObserver, TracingObserver};
pub use pipeline::{Referral, ReferralPipeline, Stage};
pub use prompt::{PromptTemplate, RenderedPrompt, TemplateError, REFUSAL_SENTENCE};
pub use sanitize::strip_reasoning;
pub use validate::validate;
