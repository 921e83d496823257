//! Run configuration, loaded once from TOML at startup and immutable
//! for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Project
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Root of the project to document. The generated README is written
    /// to `{root}/README.md`.
    #[serde(default = "d_root")]
    pub root: String,
    /// One-line description fed into every instruction prompt.
    #[serde(default)]
    pub description: String,
    /// Path-substring exclusions. A file is skipped when any of these
    /// substrings occurs anywhere in its path.
    #[serde(default = "d_exclude")]
    pub exclude: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: d_root(),
            description: String::new(),
            exclude: d_exclude(),
        }
    }
}

fn d_root() -> String {
    ".".into()
}

fn d_exclude() -> Vec<String> {
    [".git", "node_modules", "package-lock.json", ".vscode", "target"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Token budget
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Margin subtracted from the tier rate so a run never sits exactly at
/// the provider's per-minute limit.
const TPM_SAFETY_MARGIN: u32 = 1_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// OpenAI account tier; decides the tokens-per-minute allowance.
    #[serde(default)]
    pub tier: Tier,
    /// Tokens-per-minute rate when `tier = "custom"`.
    #[serde(default)]
    pub custom_tpm: Option<u32>,
    /// Maximum counted token size of any single request.
    #[serde(default = "d_max_tokens")]
    pub max_tokens_per_request: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            tier: Tier::default(),
            custom_tpm: None,
            max_tokens_per_request: d_max_tokens(),
        }
    }
}

fn d_max_tokens() -> u32 {
    15_000
}

/// OpenAI account tiers and their tokens-per-minute rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
    Custom,
}

impl Tier {
    /// Tokens-per-minute rate for this tier. `Custom` has no built-in
    /// rate and must come with `custom_tpm`.
    pub fn tokens_per_minute(self) -> Option<u32> {
        match self {
            Tier::Tier1 => Some(60_000),
            Tier::Tier2 => Some(80_000),
            Tier::Tier3 => Some(160_000),
            Tier::Tier4 => Some(1_000_000),
            Tier::Tier5 => Some(2_000_000),
            Tier::Custom => None,
        }
    }
}

/// Process-wide token budget, read-only after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    /// Maximum counted token size of any single request.
    pub max_per_request: u32,
    /// Tokens allowed per minute (tier rate minus the safety margin).
    pub per_minute_allowance: u32,
}

impl BudgetConfig {
    /// Resolve the configured tier into a concrete [`TokenBudget`].
    pub fn resolve(&self) -> Result<TokenBudget> {
        let tpm = match (self.tier, self.custom_tpm) {
            (Tier::Custom, Some(tpm)) => tpm,
            (Tier::Custom, None) => {
                return Err(Error::Config(
                    "budget.tier = \"custom\" requires budget.custom_tpm".into(),
                ))
            }
            (tier, _) => tier.tokens_per_minute().expect("non-custom tier has a rate"),
        };
        if tpm <= TPM_SAFETY_MARGIN {
            return Err(Error::Config(format!(
                "tokens-per-minute rate {tpm} must exceed the {TPM_SAFETY_MARGIN}-token safety margin"
            )));
        }
        if self.max_tokens_per_request == 0 {
            return Err(Error::Config(
                "budget.max_tokens_per_request must be greater than zero".into(),
            ));
        }
        Ok(TokenBudget {
            max_per_request: self.max_tokens_per_request,
            per_minute_allowance: tpm - TPM_SAFETY_MARGIN,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            model: d_model(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn d_model() -> String {
    "gpt-3.5-turbo".into()
}

fn d_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

fn d_timeout_ms() -> u64 {
    120_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pricing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Dollars per 1000 tokens, used for the pre-confirmation estimate.
    #[serde(default = "d_per_1k")]
    pub per_1k: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { per_1k: d_per_1k() }
    }
}

fn d_per_1k() -> f64 {
    0.0005
}

impl PricingConfig {
    /// Estimated dollar cost of a run that counts `tokens` tokens.
    pub fn estimate(&self, tokens: u32) -> f64 {
        f64::from(tokens) / 1000.0 * self.per_1k
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl Config {
    /// Check the parsed config for issues a run would trip over.
    /// Returns human-readable problem descriptions, empty when clean.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Err(e) = self.budget.resolve() {
            issues.push(e.to_string());
        }
        if self.project.description.trim().is_empty() {
            issues.push(
                "project.description is empty — the generated README quality \
                 depends on it"
                    .into(),
            );
        }
        if self.llm.base_url.trim().is_empty() {
            issues.push("llm.base_url must not be empty".into());
        }
        if self.pricing.per_1k < 0.0 {
            issues.push("pricing.per_1k must not be negative".into());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_resolves_tier1_with_margin() {
        let budget = BudgetConfig::default().resolve().unwrap();
        assert_eq!(budget.max_per_request, 15_000);
        assert_eq!(budget.per_minute_allowance, 58_500);
    }

    #[test]
    fn custom_tier_requires_tpm() {
        let cfg = BudgetConfig {
            tier: Tier::Custom,
            custom_tpm: None,
            ..Default::default()
        };
        assert!(cfg.resolve().is_err());

        let cfg = BudgetConfig {
            tier: Tier::Custom,
            custom_tpm: Some(120_000),
            ..Default::default()
        };
        assert_eq!(cfg.resolve().unwrap().per_minute_allowance, 118_500);
    }

    #[test]
    fn parses_full_toml() {
        let raw = r#"
            [project]
            root = "./demo"
            description = "A demo project."
            exclude = [".git", "vendor"]

            [budget]
            tier = "tier3"
            max_tokens_per_request = 10000

            [llm]
            model = "gpt-4o-mini"

            [pricing]
            per_1k = 0.001
        "#;
        let cfg: Config = toml::from_str(raw).unwrap();
        assert_eq!(cfg.project.root, "./demo");
        assert_eq!(cfg.project.exclude, vec![".git", "vendor"]);
        assert_eq!(cfg.budget.tier, Tier::Tier3);
        assert_eq!(cfg.budget.resolve().unwrap().per_minute_allowance, 158_500);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert!((cfg.pricing.per_1k - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.project.root, ".");
        assert_eq!(cfg.llm.api_key_env, "OPENAI_API_KEY");
        assert!(cfg.project.exclude.contains(&".git".to_string()));
    }

    #[test]
    fn cost_estimate_uses_per_1k_price() {
        let pricing = PricingConfig::default();
        let cost = pricing.estimate(20_000);
        assert!((cost - 0.01).abs() < 1e-9);
    }

    #[test]
    fn validate_reports_empty_description() {
        let cfg = Config::default();
        let issues = cfg.validate();
        assert!(issues.iter().any(|i| i.contains("description")));
    }
}
