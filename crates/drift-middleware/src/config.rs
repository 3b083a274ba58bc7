//! Reconciliation settings parsed from TOML
//!
//! ```toml
//! strict = false
//! providers = ["aws", "google"]
//! disabled = ["aws_default_vpc"]
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assembler::CANONICAL_ORDER;
use crate::error::{Error, Result};

/// Cloud provider whose stages take part in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Google,
    Azurerm,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Google, Provider::Azurerm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Google => "google",
            Self::Azurerm => "azurerm",
        }
    }

    /// Provider a stage belongs to, derived from its name prefix.
    pub fn of_stage(name: &str) -> Self {
        if name.starts_with("google_") {
            Self::Google
        } else if name.starts_with("azurerm_") {
            Self::Azurerm
        } else {
            Self::Aws
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::Config {
                message: format!("unknown provider '{s}'"),
            })
    }
}

/// Settings controlling which stages the chain contains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// When set, provider-created defaults are reported as drift: the
    /// default-suppression group is left out of the chain.
    pub strict: bool,

    /// Providers whose stages run. Empty means every provider.
    pub providers: Vec<Provider>,

    /// Stage names to leave out of the chain
    pub disabled: Vec<String>,
}

impl ReconcileConfig {
    /// Parse and validate configuration from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: ReconcileConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Reject stage names that are not part of the canonical order.
    pub fn validate(&self) -> Result<()> {
        match self
            .disabled
            .iter()
            .find(|name| !CANONICAL_ORDER.contains(&name.as_str()))
        {
            Some(name) => Err(Error::UnknownMiddleware(name.clone())),
            None => Ok(()),
        }
    }

    pub fn provider_enabled(&self, provider: Provider) -> bool {
        self.providers.is_empty() || self.providers.contains(&provider)
    }

    pub fn is_disabled(&self, stage: &str) -> bool {
        self.disabled.iter().any(|name| name == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn empty_content_uses_defaults() {
        let config = ReconcileConfig::parse("").unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert!(!config.strict);
        assert!(Provider::ALL.into_iter().all(|p| config.provider_enabled(p)));
    }

    #[test]
    fn parses_every_field() {
        let config = ReconcileConfig::parse(
            r#"
strict = true
providers = ["aws", "azurerm"]
disabled = ["aws_default_vpc", "tags_all_manager"]
"#,
        )
        .unwrap();

        assert!(config.strict);
        assert!(config.provider_enabled(Provider::Aws));
        assert!(!config.provider_enabled(Provider::Google));
        assert!(config.is_disabled("tags_all_manager"));
        assert!(!config.is_disabled("aws_default_subnet"));
    }

    #[test]
    fn unknown_disabled_stage_is_rejected() {
        let err = ReconcileConfig::parse(r#"disabled = ["aws_no_such_stage"]"#).unwrap_err();
        assert!(matches!(err, Error::UnknownMiddleware(name) if name == "aws_no_such_stage"));
    }

    #[test]
    fn unknown_provider_is_a_toml_error() {
        let err = ReconcileConfig::parse(r#"providers = ["openstack"]"#).unwrap_err();
        assert!(matches!(err, Error::TomlDe(_)));
    }

    #[rstest]
    #[case("route53_record_id_reconciler", Provider::Aws)]
    #[case("tags_all_manager", Provider::Aws)]
    #[case("google_default_iam_member", Provider::Google)]
    #[case("azurerm_subnet_expander", Provider::Azurerm)]
    fn stage_provider_follows_prefix(#[case] name: &str, #[case] expected: Provider) {
        assert_eq!(Provider::of_stage(name), expected);
    }

    #[test]
    fn provider_round_trips_through_display() {
        for provider in Provider::ALL {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
        assert!("gcp".parse::<Provider>().is_err());
    }
}
