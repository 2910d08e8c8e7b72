use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::publish::{PropertyOptions, RequestOptions};

/// Publish and inspect ECCU requests
#[derive(Parser, Debug, Clone)]
#[command(name = "eccu")]
#[command(about = "Publish and inspect ECCU (edge content control) requests")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Login used for the SOAP service
    #[arg(long = "username", global = true)]
    pub username: Option<String>,

    /// Password used for the SOAP service
    #[arg(long = "password", global = true)]
    pub password: Option<String>,

    /// SOAP endpoint URL
    #[arg(long = "endpoint", global = true)]
    pub endpoint: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", global = true)]
    pub timeout: Option<u64>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the list of the last requests made to ECCU
    Requests {
        /// Print request content too
        #[arg(short = 'c', long = "content")]
        content: bool,
    },

    /// Print the last request made to ECCU
    #[command(name = "last-request", alias = "last_request")]
    LastRequest {
        /// Print request content too
        #[arg(short = 'c', long = "content")]
        content: bool,
    },

    /// Publish a request made in XML for the specified digital property (usually the host header)
    #[command(name = "publish-xml", alias = "publish_xml")]
    PublishXml(PublishArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PublishArgs {
    /// ECCU request file (XML)
    pub source: PathBuf,

    /// Digital property the request applies to
    pub property: String,

    /// Type of enlisted properties
    #[arg(short = 'P', long = "property-type", value_name = "TYPE")]
    pub property_type: Option<String>,

    /// Do not do an exact match on property names
    #[arg(long = "no-exact-match")]
    pub no_exact_match: bool,

    /// Email(s) to use to send notification on status change
    #[arg(short = 'e', long = "emails", num_args = 1.., value_name = "EMAIL")]
    pub emails: Vec<String>,

    /// Notes attached to the request
    #[arg(short = 'n', long = "notes")]
    pub notes: Option<String>,
}

impl PublishArgs {
    pub fn property_options(&self) -> PropertyOptions {
        PropertyOptions {
            property_type: self.property_type.clone(),
            exact_match: Some(!self.no_exact_match),
        }
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            notes: self.notes.clone(),
            emails: if self.emails.is_empty() {
                None
            } else {
                Some(self.emails.clone())
            },
            ..Default::default()
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "eccu_client=debug,eccu=debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_parsing() {
        let cli = Cli::try_parse_from(["eccu", "requests", "-c"]).unwrap();
        assert_eq!(cli.command, Command::Requests { content: true });
        assert!(!cli.verbose);
    }

    #[test]
    fn test_last_request_accepts_underscore_alias() {
        let cli = Cli::try_parse_from(["eccu", "last_request"]).unwrap();
        assert_eq!(cli.command, Command::LastRequest { content: false });
    }

    #[test]
    fn test_publish_parsing() {
        let cli = Cli::try_parse_from([
            "eccu",
            "publish-xml",
            "request.xml",
            "john.com",
            "-P",
            "arlid",
            "--no-exact-match",
            "-e",
            "foo@foo.com",
            "bar@bar.com",
            "-n",
            "cleanup",
        ])
        .unwrap();

        let Command::PublishXml(args) = cli.command else {
            panic!("Expected publish-xml");
        };
        assert_eq!(args.source, PathBuf::from("request.xml"));
        assert_eq!(args.property, "john.com");
        assert_eq!(
            args.property_options(),
            PropertyOptions {
                property_type: Some("arlid".to_string()),
                exact_match: Some(false),
            }
        );

        let options = args.request_options();
        assert_eq!(
            options.emails,
            Some(vec!["foo@foo.com".to_string(), "bar@bar.com".to_string()])
        );
        assert_eq!(options.notes.as_deref(), Some("cleanup"));
        assert_eq!(options.file_name, None);
    }

    #[test]
    fn test_publish_defaults() {
        let cli = Cli::try_parse_from(["eccu", "publish_xml", "r.xml", "john.com"]).unwrap();
        let Command::PublishXml(args) = cli.command else {
            panic!("Expected publish-xml");
        };

        assert_eq!(args.property_options().property_type, None);
        assert_eq!(args.property_options().exact_match, Some(true));
        assert_eq!(args.request_options(), RequestOptions::default());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["eccu", "requests", "--username", "u", "-v"]).unwrap();
        assert_eq!(cli.username.as_deref(), Some("u"));
        assert!(cli.verbose);
        assert_eq!(cli.log_filter(), "eccu_client=debug,eccu=debug");
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["eccu"]).is_err());
    }
}
