//! Provider enumeration.

use serde::{Deserialize, Serialize};

/// The closed set of API services whose keys this crate can classify and
/// validate.
///
/// Adding a provider means touching both the identification rule chain
/// ([`crate::identify`]) and the validator registry
/// ([`crate::validators::default_validators`]) — an accepted coupling given
/// the fixed, small cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Ai21,
    MakerSuite,
    Aws,
    Azure,
    VertexAi,
    Mistral,
    OpenRouter,
    ElevenLabs,
    DeepSeek,
    Xai,
}

impl Provider {
    /// Every provider, in declaration order. Used to build registries and
    /// settings tables in lockstep with the enum.
    pub const ALL: [Provider; 12] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Ai21,
        Provider::MakerSuite,
        Provider::Aws,
        Provider::Azure,
        Provider::VertexAi,
        Provider::Mistral,
        Provider::OpenRouter,
        Provider::ElevenLabs,
        Provider::DeepSeek,
        Provider::Xai,
    ];

    /// Stable lowercase identifier, matching the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ai21 => "ai21",
            Self::MakerSuite => "makersuite",
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::VertexAi => "vertexai",
            Self::Mistral => "mistral",
            Self::OpenRouter => "openrouter",
            Self::ElevenLabs => "elevenlabs",
            Self::DeepSeek => "deepseek",
            Self::Xai => "xai",
        }
    }

    /// Construct a provider from its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
