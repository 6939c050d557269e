//! CLI argument definitions using clap
//!
//! Commands:
//! - aerocms validate --schema <uid>
//! - aerocms collect --schema <uid>
//! - aerocms create --schema <uid>
//! - aerocms update --schema <uid> --id <n>
//! - aerocms schemas
//! - aerocms webhook-check

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AeroCMS - content entries with checked relations
#[derive(Parser, Debug)]
#[command(name = "aerocms")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the relations of a payload read from stdin
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./aerocms.json")]
        config: PathBuf,

        /// Content type uid the payload is written as
        #[arg(long)]
        schema: String,

        /// Report every missing reference instead of the first
        #[arg(long)]
        all: bool,
    },

    /// Print the references a payload would be checked against
    Collect {
        /// Path to configuration file
        #[arg(long, default_value = "./aerocms.json")]
        config: PathBuf,

        /// Content type uid the payload is written as
        #[arg(long)]
        schema: String,
    },

    /// Validate and insert an entry into the data file
    Create {
        /// Path to configuration file
        #[arg(long, default_value = "./aerocms.json")]
        config: PathBuf,

        /// Content type uid
        #[arg(long)]
        schema: String,
    },

    /// Validate and update an entry in the data file
    Update {
        /// Path to configuration file
        #[arg(long, default_value = "./aerocms.json")]
        config: PathBuf,

        /// Content type uid
        #[arg(long)]
        schema: String,

        /// Entry id
        #[arg(long)]
        id: u64,
    },

    /// List registered content types
    Schemas {
        /// Path to configuration file
        #[arg(long, default_value = "./aerocms.json")]
        config: PathBuf,
    },

    /// Validate a webhook form read from stdin
    WebhookCheck {
        /// Offer draft and publish events
        #[arg(long)]
        draft_and_publish: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_arguments() {
        let cli = Cli::try_parse_from([
            "aerocms", "update", "--schema", "api::article.article", "--id", "3",
        ])
        .unwrap();
        match cli.command {
            Command::Update { config, schema, id } => {
                assert_eq!(config, PathBuf::from("./aerocms.json"));
                assert_eq!(schema, "api::article.article");
                assert_eq!(id, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_schema_is_required() {
        assert!(Cli::try_parse_from(["aerocms", "validate"]).is_err());
    }

    #[test]
    fn test_webhook_check_flag() {
        let cli = Cli::try_parse_from(["aerocms", "webhook-check", "--draft-and-publish"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::WebhookCheck {
                draft_and_publish: true
            }
        ));
    }
}
