use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TIERFIT_DIR_NAME: &str = ".tierfit";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_SHEET_NAME: &str = "License Recommendation";
pub const DEFAULT_EXPORT_STEM: &str = "License_Recommendation_Report";

/// Spreadsheet applications refuse sheet names longer than this.
pub const MAX_SHEET_NAME_CHARS: usize = 31;
const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKeyPolicy {
    #[default]
    FanOut,
    Reject,
}

impl CatalogKeyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FanOut => "fan_out",
            Self::Reject => "reject",
        }
    }
}

impl std::str::FromStr for CatalogKeyPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "fan_out" => Ok(Self::FanOut),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "invalid catalog key policy '{other}', expected one of: fan_out, reject"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserGrouping {
    #[default]
    UserName,
    UserId,
}

impl UserGrouping {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserName => "user_name",
            Self::UserId => "user_id",
        }
    }
}

impl std::str::FromStr for UserGrouping {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "user_name" => Ok(Self::UserName),
            "user_id" => Ok(Self::UserId),
            other => Err(format!(
                "invalid user grouping '{other}', expected one of: user_name, user_id"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TierfitConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub catalog_keys: CatalogKeyPolicy,
    #[serde(default)]
    pub group_by: UserGrouping,
    /// When true, "Not Assigned" against "No Data" classifies as optimized.
    #[serde(default)]
    pub sentinels_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_export_stem")]
    pub export_stem: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            export_stem: default_export_stem(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub fn tierfit_dir(workspace_root: impl AsRef<Path>) -> PathBuf {
    workspace_root.as_ref().join(TIERFIT_DIR_NAME)
}

pub fn config_path(workspace_root: impl AsRef<Path>) -> PathBuf {
    tierfit_dir(workspace_root).join(CONFIG_FILE_NAME)
}

pub fn load_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<TierfitConfig, ConfigError> {
    let path = config_path(workspace_root);
    if !path.exists() {
        return Ok(TierfitConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: TierfitConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

/// Writes the default config file unless one exists, or unconditionally when `force` is set.
pub fn ensure_workspace_config(
    workspace_root: impl AsRef<Path>,
    force: bool,
) -> Result<TierfitConfig, ConfigError> {
    let workspace_root = workspace_root.as_ref();
    fs::create_dir_all(tierfit_dir(workspace_root))?;

    let path = config_path(workspace_root);
    if path.exists() && !force {
        return load_workspace_config(workspace_root);
    }

    let config = TierfitConfig::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}

pub fn validate_config(config: &TierfitConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let sheet_name = config.report.sheet_name.as_str();

    if sheet_name.chars().count() > MAX_SHEET_NAME_CHARS {
        warnings.push(ConfigWarning {
            code: "sheet_name_too_long",
            message: format!(
                "[report].sheet_name '{sheet_name}' exceeds {MAX_SHEET_NAME_CHARS} characters and may be truncated by spreadsheet tools"
            ),
        });
    }

    if sheet_name.contains(SHEET_NAME_FORBIDDEN) {
        warnings.push(ConfigWarning {
            code: "sheet_name_invalid_chars",
            message: format!(
                "[report].sheet_name '{sheet_name}' contains one of [ ] : * ? / \\ which spreadsheet tools reject"
            ),
        });
    }

    if config.report.export_stem.contains(['/', '\\']) {
        warnings.push(ConfigWarning {
            code: "export_stem_has_separator",
            message: format!(
                "[report].export_stem '{}' contains a path separator; pass a directory to --export instead",
                config.report.export_stem
            ),
        });
    }

    if config.analysis.sentinels_match {
        warnings.push(ConfigWarning {
            code: "sentinels_match_enabled",
            message: "[analysis].sentinels_match=true reports users with no license and no usage data as Optimized".to_owned(),
        });
    }

    warnings
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_owned()
}

fn default_export_stem() -> String {
    DEFAULT_EXPORT_STEM.to_owned()
}

fn normalize_required(input: &str, fallback: fn() -> String) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.to_owned()
    }
}

fn normalize_config(mut config: TierfitConfig) -> TierfitConfig {
    config.report.sheet_name = normalize_required(&config.report.sheet_name, default_sheet_name);
    config.report.export_stem =
        normalize_required(&config.report.export_stem, default_export_stem);
    config
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn load_workspace_config_defaults_when_file_is_missing() {
        let temp = tempdir().expect("tempdir");

        let config = load_workspace_config(temp.path()).expect("load config");

        assert_eq!(config, TierfitConfig::default());
        assert_eq!(config.analysis.catalog_keys, CatalogKeyPolicy::FanOut);
        assert_eq!(config.analysis.group_by, UserGrouping::UserName);
        assert!(!config.analysis.sentinels_match);
        assert_eq!(config.report.sheet_name, DEFAULT_SHEET_NAME);
        assert!(!config_path(temp.path()).exists());
    }

    #[test]
    fn ensure_workspace_config_creates_default_file() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();

        let config = ensure_workspace_config(workspace, false).expect("ensure config");

        assert_eq!(config.report.export_stem, DEFAULT_EXPORT_STEM);
        assert!(config_path(workspace).exists());

        let content = fs::read_to_string(config_path(workspace)).expect("read config file");
        assert!(content.contains("[analysis]"));
        assert!(content.contains("catalog_keys = \"fan_out\""));
        assert!(content.contains("sheet_name = \"License Recommendation\""));
    }

    #[test]
    fn ensure_workspace_config_keeps_existing_file_unless_forced() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();
        fs::create_dir_all(tierfit_dir(workspace)).expect("create .tierfit");
        fs::write(
            config_path(workspace),
            "[analysis]\ncatalog_keys = \"reject\"\n",
        )
        .expect("write config");

        let kept = ensure_workspace_config(workspace, false).expect("ensure config");
        assert_eq!(kept.analysis.catalog_keys, CatalogKeyPolicy::Reject);

        let reset = ensure_workspace_config(workspace, true).expect("force config");
        assert_eq!(reset.analysis.catalog_keys, CatalogKeyPolicy::FanOut);
        let reloaded = load_workspace_config(workspace).expect("reload config");
        assert_eq!(reloaded, TierfitConfig::default());
    }

    #[test]
    fn load_workspace_config_parses_and_trims_values() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();
        fs::create_dir_all(tierfit_dir(workspace)).expect("create .tierfit");

        let raw = r#"
[analysis]
catalog_keys = "reject"
group_by = "user_id"
sentinels_match = true

[report]
sheet_name = "  Q3 Audit  "
export_stem = "   "
"#;
        fs::write(config_path(workspace), raw).expect("write config");

        let config = load_workspace_config(workspace).expect("load config");

        assert_eq!(config.analysis.catalog_keys, CatalogKeyPolicy::Reject);
        assert_eq!(config.analysis.group_by, UserGrouping::UserId);
        assert!(config.analysis.sentinels_match);
        assert_eq!(config.report.sheet_name, "Q3 Audit");
        assert_eq!(config.report.export_stem, DEFAULT_EXPORT_STEM);
    }

    #[test]
    fn load_workspace_config_rejects_unknown_policy() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();
        fs::create_dir_all(tierfit_dir(workspace)).expect("create .tierfit");
        fs::write(
            config_path(workspace),
            "[analysis]\ncatalog_keys = \"dedupe\"\n",
        )
        .expect("write config");

        let err = load_workspace_config(workspace).expect_err("expected parse error");
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn validate_config_flags_unusable_sheet_names() {
        let mut config = TierfitConfig::default();
        assert!(validate_config(&config).is_empty());

        config.report.sheet_name = "Licensing: review/approval for all regions".to_owned();
        let codes = validate_config(&config)
            .into_iter()
            .map(|warning| warning.code)
            .collect::<Vec<_>>();

        assert_eq!(codes, vec!["sheet_name_too_long", "sheet_name_invalid_chars"]);
    }

    #[test]
    fn policy_names_round_trip_through_from_str() {
        for policy in [CatalogKeyPolicy::FanOut, CatalogKeyPolicy::Reject] {
            assert_eq!(policy.as_str().parse::<CatalogKeyPolicy>(), Ok(policy));
        }
        for grouping in [UserGrouping::UserName, UserGrouping::UserId] {
            assert_eq!(grouping.as_str().parse::<UserGrouping>(), Ok(grouping));
        }
        assert!("dedupe".parse::<CatalogKeyPolicy>().is_err());
    }
}
