use anyhow::Result;
use tierfit::cli::parse_cli;
use tierfit::commands::run;
use tierfit::logging::init_logging;

fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.log_format)?;

    let mut out = std::io::stdout().lock();
    run(cli, &mut out)
}
