//! HTF CLI - Command line tool for high tide flooding thresholds and projections.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "htf-cli",
    version,
    about = "High tide flooding data toolkit"
)]
struct Cli {
    #[command(flatten)]
    options: htf_cmd::config::GlobalOptions,

    #[command(subcommand)]
    command: htf_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[HTF] cli: data dir {}", cli.options.data_dir.display());
    htf_cmd::run(cli.options, cli.command)
}
