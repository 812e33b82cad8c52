// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! The catalogue of external AI inference providers.
//!
//! Each provider is configured through one or more environment variables,
//! such as `FOREFRONTAI_API_KEY` for [ForefrontAI](Provider::ForefrontAI) or
//! `REPLICATE_API_TOKEN` for [Replicate](Provider::Replicate). The same
//! variables may also be stored as per-user settings; see
//! [`auth::Auth::resolve()`](crate::auth::Auth::resolve) for how the two
//! sources are combined.
//!
//! **Requests made with these credentials are proxied to the provider's own
//! servers.** Consult each provider's [privacy policy](Provider::privacy_policy)
//! before storing a key.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every environment variable recognised as an external provider setting,
/// in display order.
pub const EXTERNAL_PROVIDER_ENVVARS: [&str; 28] = [
    "AI21_API_KEY",
    "ALEPH_ALPHA_API_KEY",
    "ANYSCALE_SERVICE_URL",
    "ANYSCALE_SERVICE_ROUTE",
    "ANYSCALE_SERVICE_TOKEN",
    "AVIARY_URL",
    "AVIARY_TOKEN",
    "BANANA_API_KEY",
    "BEAM_CLIENT_ID",
    "BEAM_CLIENT_SECRET",
    "COHERE_API_KEY",
    "DATABRICKS_HOST",
    "DATABRICKS_API_TOKEN",
    "DEEPINFRA_API_TOKEN",
    "FOREFRONTAI_API_KEY",
    "GOOGLE_API_KEY",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "GOOSEAI_API_KEY",
    "HUGGINGFACE_API_KEY",
    "HUGGINGFACEHUB_API_TOKEN",
    "MOSAICML_API_TOKEN",
    "NLPCLOUD_API_KEY",
    "OPENAI_API_KEY",
    "REPLICATE_API_TOKEN",
    "STOCHASTICAI_API_KEY",
    "TEXT_GENERATION_INFERENCE_TOKEN",
    "WRITER_API_KEY",
    "WRITER_ORG_ID",
];

/// True if `name` is one of the [`EXTERNAL_PROVIDER_ENVVARS`].
///
/// # Examples
///
/// ```
/// use aikeys::provider::is_external_provider_envvar;
/// assert!(is_external_provider_envvar("REPLICATE_API_TOKEN"));
/// assert!(!is_external_provider_envvar("PATH"));
/// ```
pub fn is_external_provider_envvar(name: &str) -> bool {
    EXTERNAL_PROVIDER_ENVVARS.contains(&name)
}

/// An external AI inference provider.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Provider {
    AI21,
    AlephAlpha,
    Anyscale,
    Aviary,
    Banana,
    Beam,
    Cohere,
    Databricks,
    DeepInfra,

    /// Hosted service for fine-tuning and running open-source large
    /// language models.
    ///
    /// Authenticated with `$FOREFRONTAI_API_KEY`.
    ForefrontAI,

    Google,
    GooseAI,
    HuggingFace,
    MosaicML,
    NLPCloud,
    OpenAI,

    /// Hosted service for running machine-learning models in the cloud.
    ///
    /// Authenticated with `$REPLICATE_API_TOKEN`.
    Replicate,

    StochasticAI,
    TextGenerationInference,
    Writer,
}

impl Provider {
    const ALL: [Provider; 20] = [
        Provider::AI21,
        Provider::AlephAlpha,
        Provider::Anyscale,
        Provider::Aviary,
        Provider::Banana,
        Provider::Beam,
        Provider::Cohere,
        Provider::Databricks,
        Provider::DeepInfra,
        Provider::ForefrontAI,
        Provider::Google,
        Provider::GooseAI,
        Provider::HuggingFace,
        Provider::MosaicML,
        Provider::NLPCloud,
        Provider::OpenAI,
        Provider::Replicate,
        Provider::StochasticAI,
        Provider::TextGenerationInference,
        Provider::Writer,
    ];

    /// Every known provider, in catalogue order.
    pub fn all() -> impl Iterator<Item = Provider> {
        Self::ALL.into_iter()
    }

    /// The provider that consumes the environment variable `name`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use aikeys::provider::Provider;
    /// assert_eq!(Provider::from_envvar("FOREFRONTAI_API_KEY"), Some(Provider::ForefrontAI));
    /// assert_eq!(Provider::from_envvar("HOME"), None);
    /// ```
    pub fn from_envvar(name: &str) -> Option<Provider> {
        Self::all().find(|provider| provider.envvars().contains(&name))
    }

    /// Environment variables used to configure this provider.
    pub fn envvars(&self) -> &'static [&'static str] {
        match self {
            Provider::AI21 => &["AI21_API_KEY"],
            Provider::AlephAlpha => &["ALEPH_ALPHA_API_KEY"],
            Provider::Anyscale => &[
                "ANYSCALE_SERVICE_URL",
                "ANYSCALE_SERVICE_ROUTE",
                "ANYSCALE_SERVICE_TOKEN",
            ],
            Provider::Aviary => &["AVIARY_URL", "AVIARY_TOKEN"],
            Provider::Banana => &["BANANA_API_KEY"],
            Provider::Beam => &["BEAM_CLIENT_ID", "BEAM_CLIENT_SECRET"],
            Provider::Cohere => &["COHERE_API_KEY"],
            Provider::Databricks => &["DATABRICKS_HOST", "DATABRICKS_API_TOKEN"],
            Provider::DeepInfra => &["DEEPINFRA_API_TOKEN"],
            Provider::ForefrontAI => &["FOREFRONTAI_API_KEY"],
            Provider::Google => &["GOOGLE_API_KEY", "GOOGLE_APPLICATION_CREDENTIALS"],
            Provider::GooseAI => &["GOOSEAI_API_KEY"],
            Provider::HuggingFace => &["HUGGINGFACE_API_KEY", "HUGGINGFACEHUB_API_TOKEN"],
            Provider::MosaicML => &["MOSAICML_API_TOKEN"],
            Provider::NLPCloud => &["NLPCLOUD_API_KEY"],
            Provider::OpenAI => &["OPENAI_API_KEY"],
            Provider::Replicate => &["REPLICATE_API_TOKEN"],
            Provider::StochasticAI => &["STOCHASTICAI_API_KEY"],
            Provider::TextGenerationInference => &["TEXT_GENERATION_INFERENCE_TOKEN"],
            Provider::Writer => &["WRITER_API_KEY", "WRITER_ORG_ID"],
        }
    }

    /// The environment variable holding the provider's primary secret.
    ///
    /// This is the variable used to build an [`Auth`](crate::auth::Auth)
    /// for the provider.
    pub fn api_key_envvar(&self) -> &'static str {
        match self {
            Provider::Anyscale => "ANYSCALE_SERVICE_TOKEN",
            Provider::Aviary => "AVIARY_TOKEN",
            Provider::Beam => "BEAM_CLIENT_SECRET",
            Provider::Databricks => "DATABRICKS_API_TOKEN",
            Provider::Google => "GOOGLE_API_KEY",
            Provider::HuggingFace => "HUGGINGFACEHUB_API_TOKEN",
            Provider::Writer => "WRITER_API_KEY",
            single => single.envvars()[0],
        }
    }

    /// Short identifier used on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::AI21 => "ai21",
            Provider::AlephAlpha => "aleph-alpha",
            Provider::Anyscale => "anyscale",
            Provider::Aviary => "aviary",
            Provider::Banana => "banana",
            Provider::Beam => "beam",
            Provider::Cohere => "cohere",
            Provider::Databricks => "databricks",
            Provider::DeepInfra => "deepinfra",
            Provider::ForefrontAI => "forefrontai",
            Provider::Google => "google",
            Provider::GooseAI => "gooseai",
            Provider::HuggingFace => "huggingface",
            Provider::MosaicML => "mosaicml",
            Provider::NLPCloud => "nlpcloud",
            Provider::OpenAI => "openai",
            Provider::Replicate => "replicate",
            Provider::StochasticAI => "stochasticai",
            Provider::TextGenerationInference => "text-generation-inference",
            Provider::Writer => "writer",
        }
    }

    /// Human-readable name of the provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::AI21 => "AI21 Labs",
            Provider::AlephAlpha => "Aleph Alpha",
            Provider::Anyscale => "Anyscale",
            Provider::Aviary => "Aviary",
            Provider::Banana => "Banana",
            Provider::Beam => "Beam",
            Provider::Cohere => "Cohere",
            Provider::Databricks => "Databricks",
            Provider::DeepInfra => "DeepInfra",
            Provider::ForefrontAI => "ForefrontAI",
            Provider::Google => "Google",
            Provider::GooseAI => "GooseAI",
            Provider::HuggingFace => "Hugging Face",
            Provider::MosaicML => "MosaicML",
            Provider::NLPCloud => "NLP Cloud",
            Provider::OpenAI => "OpenAI",
            Provider::Replicate => "Replicate",
            Provider::StochasticAI => "StochasticAI",
            Provider::TextGenerationInference => "Text Generation Inference",
            Provider::Writer => "Writer",
        }
    }

    /// A one-line description of what the provider hosts.
    pub fn description(&self) -> &'static str {
        match self {
            Provider::ForefrontAI => {
                "Fine-tune and run open-source large language models as a hosted service"
            }
            Provider::Replicate => "Run machine-learning models in the cloud",
            Provider::Anyscale | Provider::Aviary => "Hosted open-source LLM endpoints on Ray",
            Provider::Databricks => "Model serving endpoints in a Databricks workspace",
            Provider::HuggingFace => "Hugging Face Hub and Inference API",
            Provider::TextGenerationInference => "Self-hosted text generation inference server",
            Provider::Google => "Google generative AI and Vertex AI models",
            _ => "Hosted large language model API",
        }
    }

    /// Where to read the provider's privacy policy, if known.
    ///
    /// Requests made with a provider's credentials are proxied to that
    /// provider's servers, so users should read this before storing a key.
    pub fn privacy_policy(&self) -> Option<&'static str> {
        match self {
            Provider::ForefrontAI => Some("https://www.forefront.ai/privacy"),
            Provider::Replicate => Some("https://replicate.com/privacy"),
            Provider::OpenAI => Some("https://openai.com/policies/privacy-policy"),
            _ => None,
        }
    }

    /// An authenticated endpoint that answers with a successful status
    /// when the credential is valid, if the provider has one.
    pub fn verify_url(&self) -> Option<&'static str> {
        match self {
            Provider::Replicate => Some("https://api.replicate.com/v1/account"),
            Provider::OpenAI => Some("https://api.openai.com/v1/models"),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Indicates that a provider identifier is not in the catalogue.
#[derive(Debug, Error, PartialEq)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Provider::all()
            .find(|provider| provider.id() == needle)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}
