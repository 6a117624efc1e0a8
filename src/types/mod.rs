//! Core data types: the provider enum, the key model, per-request options,
//! and the validation outcome.

mod key;
mod options;
mod provider;
mod result;

pub use key::{
    Ai21Details, AnthropicDetails, ApiKey, AwsDetails, AzureDetails, DeepSeekDetails,
    ElevenLabsDetails, KeyDetails, MakerSuiteDetails, MistralDetails, OpenAiDetails,
    OpenRouterDetails, VertexAiDetails, XaiDetails,
};
pub use options::ValidationOptions;
pub use provider::Provider;
pub use result::ValidationResult;
