use std::ffi::OsStr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tierfit_config::{AnalysisConfig, CatalogKeyPolicy, UserGrouping};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid log format '{other}', expected one of: human, json"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid output format '{other}', expected one of: table, json"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid export format '{other}', expected one of: csv, json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file with defaults")]
    pub force: bool,
}

/// Per-run overrides of the `[analysis]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Args)]
pub struct AnalysisOverrides {
    #[arg(
        long,
        value_parser = parse_user_grouping,
        help = "Group users by user_name or user_id (overrides config)"
    )]
    pub group_by: Option<UserGrouping>,

    #[arg(
        long,
        value_parser = parse_catalog_key_policy,
        help = "Duplicate catalog tcodes: fan_out or reject (overrides config)"
    )]
    pub catalog_keys: Option<CatalogKeyPolicy>,
}

impl AnalysisOverrides {
    pub fn apply(self, config: &mut AnalysisConfig) {
        if let Some(group_by) = self.group_by {
            config.group_by = group_by;
        }
        if let Some(catalog_keys) = self.catalog_keys {
            config.catalog_keys = catalog_keys;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ActivityArgs {
    #[arg(long, value_name = "PATH", help = "Activity file (.csv or Excel workbook) with Tcode and User Name columns")]
    pub activity: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DatasetArgs {
    #[command(flatten)]
    pub activity: ActivityArgs,

    #[arg(long, value_name = "PATH", help = "Catalog file (.csv or Excel workbook) with Tcode and License Type columns")]
    pub catalog: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct UsersArgs {
    #[command(flatten)]
    pub activity: ActivityArgs,

    #[command(flatten)]
    pub overrides: AnalysisOverrides,

    #[arg(
        long,
        default_value = "table",
        value_parser = parse_output_format,
        help = "Output format: table or json"
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct UserArgs {
    #[arg(help = "User to analyze, matched against the configured grouping key")]
    pub user: String,

    #[command(flatten)]
    pub datasets: DatasetArgs,

    #[command(flatten)]
    pub overrides: AnalysisOverrides,

    #[arg(
        long,
        default_value = "table",
        value_parser = parse_output_format,
        help = "Output format: table or json"
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub datasets: DatasetArgs,

    #[command(flatten)]
    pub overrides: AnalysisOverrides,

    #[arg(
        long,
        default_value = "table",
        value_parser = parse_output_format,
        help = "Output format: table or json"
    )]
    pub output: OutputFormat,

    #[arg(
        long,
        value_name = "PATH",
        help = "Write the recommendation table to a file, or into a directory using the configured export stem"
    )]
    pub export: Option<PathBuf>,

    #[arg(
        long,
        default_value = "csv",
        value_parser = parse_export_format,
        requires = "export",
        help = "Export format: csv or json"
    )]
    pub export_format: ExportFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Write the default workspace config to .tierfit/config.toml
    Init(InitArgs),
    /// List distinct users found in an activity dataset
    Users(UsersArgs),
    /// Analyze a single user's license fit
    User(UserArgs),
    /// Analyze every user and summarize the population
    Report(ReportArgs),
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "License tier recommendations from transaction usage")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Workspace root holding .tierfit/config.toml"
    )]
    pub workspace: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = parse_log_format,
        help = "Log format: human or json"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

pub fn parse_cli() -> Cli {
    let mut args: Vec<_> = std::env::args_os().collect();
    if args.get(1).is_some_and(|arg| arg == OsStr::new("--")) {
        args.remove(1);
    }

    Cli::parse_from(args)
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse()
}

fn parse_output_format(value: &str) -> Result<OutputFormat, String> {
    value.parse()
}

fn parse_export_format(value: &str) -> Result<ExportFormat, String> {
    value.parse()
}

fn parse_user_grouping(value: &str) -> Result<UserGrouping, String> {
    value.parse()
}

fn parse_catalog_key_policy(value: &str) -> Result<CatalogKeyPolicy, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use tierfit_config::{AnalysisConfig, CatalogKeyPolicy, UserGrouping};

    use super::{AnalysisOverrides, Cli, Commands, ExportFormat, LogFormat, OutputFormat};

    #[test]
    fn init_subcommand_parses_with_defaults() {
        let cli = Cli::try_parse_from(["tierfit", "init"]).expect("init should parse");

        assert_eq!(cli.workspace, PathBuf::from("."));
        assert_eq!(cli.log_format, LogFormat::Human);
        match cli.command {
            Commands::Init(args) => assert!(!args.force),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn user_subcommand_parses_name_datasets_and_output() {
        let cli = Cli::try_parse_from([
            "tierfit",
            "user",
            "Alice",
            "--activity",
            "usage.csv",
            "--catalog",
            "catalog.csv",
            "--output",
            "json",
            "--workspace",
            "/tmp/ws",
        ])
        .expect("user should parse");

        assert_eq!(cli.workspace, PathBuf::from("/tmp/ws"));
        match cli.command {
            Commands::User(args) => {
                assert_eq!(args.user, "Alice");
                assert_eq!(args.datasets.activity.activity, PathBuf::from("usage.csv"));
                assert_eq!(args.datasets.catalog, PathBuf::from("catalog.csv"));
                assert_eq!(args.output, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_subcommand_parses_export_flags() {
        let cli = Cli::try_parse_from([
            "tierfit",
            "--log-format",
            "json",
            "report",
            "--activity",
            "usage.csv",
            "--catalog",
            "catalog.csv",
            "--export",
            "out",
            "--export-format",
            "json",
        ])
        .expect("report should parse");

        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.output, OutputFormat::Table);
                assert_eq!(args.export, Some(PathBuf::from("out")));
                assert_eq!(args.export_format, ExportFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn export_format_requires_export_path() {
        let err = Cli::try_parse_from([
            "tierfit",
            "report",
            "--activity",
            "usage.csv",
            "--catalog",
            "catalog.csv",
            "--export-format",
            "json",
        ])
        .expect_err("export format without export should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn users_subcommand_only_needs_activity() {
        let cli = Cli::try_parse_from(["tierfit", "users", "--activity", "usage.csv"])
            .expect("users should parse");

        match cli.command {
            Commands::Users(args) => {
                assert_eq!(args.activity.activity, PathBuf::from("usage.csv"));
                assert_eq!(args.output, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn analysis_overrides_parse_and_replace_config_values() {
        let cli = Cli::try_parse_from([
            "tierfit",
            "report",
            "--activity",
            "usage.csv",
            "--catalog",
            "catalog.csv",
            "--group-by",
            "user_id",
            "--catalog-keys",
            "reject",
        ])
        .expect("report with overrides should parse");

        let Commands::Report(args) = cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };
        assert_eq!(args.overrides.group_by, Some(UserGrouping::UserId));
        assert_eq!(args.overrides.catalog_keys, Some(CatalogKeyPolicy::Reject));

        let mut config = AnalysisConfig {
            sentinels_match: true,
            ..AnalysisConfig::default()
        };
        args.overrides.apply(&mut config);
        assert_eq!(config.group_by, UserGrouping::UserId);
        assert_eq!(config.catalog_keys, CatalogKeyPolicy::Reject);
        assert!(config.sentinels_match);
    }

    #[test]
    fn absent_overrides_keep_config_values() {
        let mut config = AnalysisConfig {
            group_by: UserGrouping::UserId,
            ..AnalysisConfig::default()
        };

        AnalysisOverrides::default().apply(&mut config);

        assert_eq!(config.group_by, UserGrouping::UserId);
        assert_eq!(config.catalog_keys, CatalogKeyPolicy::FanOut);
    }

    #[test]
    fn group_by_override_rejects_unknown_value() {
        let err = Cli::try_parse_from([
            "tierfit",
            "users",
            "--activity",
            "usage.csv",
            "--group-by",
            "email",
        ])
        .expect_err("unknown grouping should fail");

        assert!(err.to_string().contains("expected one of: user_name, user_id"));
    }

    #[test]
    fn output_format_rejects_unknown_value() {
        let err = "xlsx".parse::<OutputFormat>().expect_err("expected error");
        assert!(err.contains("expected one of: table, json"));
    }
}
