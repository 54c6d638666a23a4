use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tierfit_analysis::LicenseAnalyzer;
use tierfit_config::{
    TierfitConfig, config_path, ensure_workspace_config, load_workspace_config, validate_config,
};
use tierfit_core::{ActivityRecord, CatalogEntry};
use tierfit_ingest::{Loaded, read_activity_file, read_catalog_file};

use crate::cli::{
    AnalysisOverrides, Cli, Commands, DatasetArgs, InitArgs, ReportArgs, UserArgs, UsersArgs,
};
use crate::export::export_assessments;
use crate::render::{write_population_report, write_user_report, write_users};

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let workspace = cli.workspace.canonicalize().with_context(|| {
        format!(
            "failed to resolve workspace path {}",
            cli.workspace.display()
        )
    })?;

    match cli.command {
        Commands::Init(args) => run_init(&workspace, args, out),
        Commands::Users(args) => run_users(&workspace, args, out),
        Commands::User(args) => run_user(&workspace, args, out),
        Commands::Report(args) => run_report(&workspace, args, out),
    }
}

fn run_init(workspace: &Path, args: InitArgs, out: &mut dyn Write) -> Result<()> {
    let path = config_path(workspace);
    let existed = path.exists();
    ensure_workspace_config(workspace, args.force).with_context(|| {
        format!("failed to write workspace config at {}", path.display())
    })?;

    let action = match (existed, args.force) {
        (false, _) => "created",
        (true, true) => "overwrote",
        (true, false) => "kept existing",
    };
    writeln!(out, "{action} {}", path.display())?;
    Ok(())
}

fn run_users(workspace: &Path, args: UsersArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_config(workspace, args.overrides)?;
    let activity = load_activity(&args.activity.activity)?;
    let analyzer = LicenseAnalyzer::new(activity.records, Vec::new(), &config.analysis)
        .context("failed to prepare analysis")?;

    write_users(&analyzer.users(), args.output, out)
}

fn run_user(workspace: &Path, args: UserArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_config(workspace, args.overrides)?;
    let (analyzer, skipped_rows) = load_analyzer(&args.datasets, &config)?;
    let mut report = analyzer
        .user_report(&args.user)
        .with_context(|| format!("failed to build report for user '{}'", args.user.trim()))?;
    report.notes.extend(skipped_rows_note(skipped_rows));

    write_user_report(&report, args.output, out)
}

fn run_report(workspace: &Path, args: ReportArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_config(workspace, args.overrides)?;
    let (analyzer, skipped_rows) = load_analyzer(&args.datasets, &config)?;

    let mut report = analyzer.population_report();
    report.notes.extend(skipped_rows_note(skipped_rows));

    write_population_report(&report, args.output, out)?;

    if let Some(target) = args.export.as_deref() {
        let path = export_assessments(
            &report.assessments,
            args.export_format,
            &config.report,
            target,
        )?;
        tracing::info!(path = %path.display(), "recommendation table written");
    }
    Ok(())
}

fn load_config(workspace: &Path, overrides: AnalysisOverrides) -> Result<TierfitConfig> {
    let mut config = load_workspace_config(workspace).with_context(|| {
        format!(
            "failed to load workspace config at {}",
            config_path(workspace).display()
        )
    })?;
    for warning in validate_config(&config) {
        tracing::warn!(code = warning.code, "config warning: {}", warning.message);
    }
    overrides.apply(&mut config.analysis);
    Ok(config)
}

/// Loads both datasets into an analyzer. Also returns how many input rows were skipped.
fn load_analyzer(
    datasets: &DatasetArgs,
    config: &TierfitConfig,
) -> Result<(LicenseAnalyzer, usize)> {
    let activity = load_activity(&datasets.activity.activity)?;
    let catalog = load_catalog(&datasets.catalog)?;
    let skipped_rows = activity.skipped_rows.len() + catalog.skipped_rows.len();

    let analyzer = LicenseAnalyzer::new(activity.records, catalog.records, &config.analysis)
        .context("failed to prepare analysis")?;
    Ok((analyzer, skipped_rows))
}

fn skipped_rows_note(skipped_rows: usize) -> Option<String> {
    (skipped_rows > 0).then(|| {
        format!("{skipped_rows} input rows were skipped for a blank User Name or Tcode value")
    })
}

fn load_activity(path: &Path) -> Result<Loaded<ActivityRecord>> {
    read_activity_file(path)
        .with_context(|| format!("failed to load activity dataset {}", path.display()))
}

fn load_catalog(path: &Path) -> Result<Loaded<CatalogEntry>> {
    read_catalog_file(path)
        .with_context(|| format!("failed to load catalog dataset {}", path.display()))
}
