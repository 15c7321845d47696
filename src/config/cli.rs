use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_required_field, validate_url, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "milestone-sync")]
#[command(about = "Create and update GitHub milestones from a JSON configuration")]
pub struct CliConfig {
    #[arg(long, help = "Path to milestones.json configuration file")]
    pub config: String,

    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub personal access token (or set GITHUB_TOKEN)"
    )]
    pub token: Option<String>,

    #[arg(
        long,
        default_value = "https://api.github.com",
        help = "API base URL (override for GitHub Enterprise)"
    )]
    pub api_base: String,

    #[arg(long, help = "Show what would be done without making changes")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        validate_url("api_base", &self.api_base)?;
        validate_required_field("token (or GITHUB_TOKEN env var)", &self.token)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            config: "milestones.json".to_string(),
            token: Some("ghp_test".to_string()),
            api_base: "https://api.github.com".to_string(),
            dry_run: false,
            verbose: false,
        }
    }

    #[test]
    fn test_valid_cli_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let mut config = base_config();
        config.token = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_api_base_is_rejected() {
        let mut config = base_config();
        config.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
