//! Provider Pattern Matcher
//!
//! Classifies an opaque key-like string into a [`Provider`] via an ordered,
//! short-circuiting rule chain. The order is load-bearing: several providers
//! issue keys with overlapping shapes (most notably the shared `sk-` prefix
//! used by OpenAI, Anthropic and DeepSeek), and a key must always land in the
//! first rule that claims it.
//!
//! The whole chain is pure string classification except for one
//! filesystem-existence check (a Vertex AI "key" is a path to a service
//! account file, not a secret string).

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Provider;

lazy_static! {
    static ref OPENAI_RE: Regex =
        Regex::new(r"sk-[a-zA-Z0-9_-]+T3BlbkFJ[a-zA-Z0-9_-]+").expect("openai pattern");
    static ref ANTHROPIC_PRIMARY_RE: Regex =
        Regex::new(r"sk-ant-api03-[A-Za-z0-9\-_]{93}AA").expect("anthropic primary pattern");
    static ref ANTHROPIC_SECONDARY_RE: Regex =
        Regex::new(r"sk-ant-[A-Za-z0-9\-_]{86}").expect("anthropic secondary pattern");
    static ref ANTHROPIC_BARE_RE: Regex =
        Regex::new(r"sk-[A-Za-z0-9]{86}").expect("anthropic bare pattern");
    static ref MAKERSUITE_RE: Regex =
        Regex::new(r"AIzaSy[A-Za-z0-9\-_]{33}").expect("makersuite pattern");
    static ref XAI_RE: Regex = Regex::new(r"xai-[A-Za-z0-9]{80}").expect("xai pattern");
    static ref OPENROUTER_RE: Regex =
        Regex::new(r"sk-or-v1-[a-z0-9]{64}").expect("openrouter pattern");
    static ref DEEPSEEK_RE: Regex = Regex::new(r"sk-[a-f0-9]{32}").expect("deepseek pattern");
    static ref AWS_RE: Regex =
        Regex::new(r"^(AKIA[0-9A-Z]{16}):([A-Za-z0-9+/]{40})$").expect("aws pattern");
    static ref AZURE_RE: Regex = Regex::new(r"^(.+):([a-z0-9]{32})$").expect("azure pattern");
    static ref ELEVENLABS_PREFIXED_RE: Regex =
        Regex::new(r"sk_[a-z0-9]{48}").expect("elevenlabs prefixed pattern");
    static ref ELEVENLABS_LOWER32_RE: Regex =
        Regex::new(r"[a-z0-9]{32}").expect("elevenlabs generic pattern");
    static ref GENERIC32_RE: Regex = Regex::new(r"[A-Za-z0-9]{32}").expect("generic 32 pattern");
}

/// Identify the provider of `raw_key`, or `None` when no pattern claims it.
///
/// The input is trimmed of surrounding whitespace and double quotes before
/// matching. Deterministic and total: every input reaches exactly one
/// terminal branch.
pub fn identify(raw_key: &str) -> Option<Provider> {
    let key = raw_key.trim().trim_matches('"');
    if key.is_empty() {
        return None;
    }

    // Vertex AI credentials are service-account file paths.
    if has_json_suffix(key) && Path::new(key).exists() {
        return Some(Provider::VertexAi);
    }

    // Anthropic's own prefix, strict high-entropy form before the legacy one.
    if key.starts_with("sk-ant-") {
        if key.contains("api03") && ANTHROPIC_PRIMARY_RE.is_match(key) {
            return Some(Provider::Anthropic);
        }
        if ANTHROPIC_SECONDARY_RE.is_match(key) {
            return Some(Provider::Anthropic);
        }
    }

    // Distinct literal prefixes, cheap prefix test before the pattern match.
    if key.starts_with("AIzaSy") && MAKERSUITE_RE.is_match(key) {
        return Some(Provider::MakerSuite);
    }
    if key.starts_with("xai-") && XAI_RE.is_match(key) {
        return Some(Provider::Xai);
    }
    if key.starts_with("sk-or-v1-") && OPENROUTER_RE.is_match(key) {
        return Some(Provider::OpenRouter);
    }

    // The shared "sk-" prefix: DeepSeek by length, then Anthropic by marker
    // exclusion, then OpenAI by its embedded marker. Precedence is exact.
    if key.starts_with("sk-") {
        if key.len() < 36 && DEEPSEEK_RE.is_match(key) {
            return Some(Provider::DeepSeek);
        }
        if key.len() > 36 && !key.contains("T3BlbkFJ") && ANTHROPIC_BARE_RE.is_match(key) {
            return Some(Provider::Anthropic);
        }
        if OPENAI_RE.is_match(key) {
            return Some(Provider::OpenAi);
        }
    }

    // Colon-delimited pairs: the AWS shape is the strict subset, so it goes
    // first; any other pair with a 32-char lowercase secret is Azure.
    if key.contains(':') {
        if key.contains("AKIA") && AWS_RE.is_match(key) {
            return Some(Provider::Aws);
        }
        if !key.contains("AKIA") && AZURE_RE.is_match(key) {
            return Some(Provider::Azure);
        }
    }

    if key.starts_with("sk_") && ELEVENLABS_PREFIXED_RE.is_match(key) {
        return Some(Provider::ElevenLabs);
    }
    if ELEVENLABS_LOWER32_RE.is_match(key) {
        return Some(Provider::ElevenLabs);
    }

    // A bare 32-char alphanumeric key is indistinguishable from a Mistral
    // key at this layer; it is reported as AI21.
    // TODO: fall back to Mistral validation when AI21 rejects such a key.
    if GENERIC32_RE.is_match(key) && key.len() == 32 {
        return Some(Provider::Ai21);
    }

    None
}

fn has_json_suffix(key: &str) -> bool {
    key.get(key.len().saturating_sub(5)..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case(".json"))
}
