//! AI Integration Layer
//!
//! Chat-completion gateways, the classification prompt and reply parsing.

pub mod prompt;
pub mod provider;
pub mod validation;

pub use prompt::{SYSTEM_PROMPT, UserMessageBuilder, build_user_message};
pub use provider::{
    CallResult, GenerationParams, HttpGateway, LlmGateway, ModelSpeed, ProviderConfig,
    ProviderKind, SharedGateway, Throttle, create_gateway,
};
pub use validation::{JsonRepairer, parse_classification_reply};
