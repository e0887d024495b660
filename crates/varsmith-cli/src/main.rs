use clap::Parser;
use varsmith_cli::{execute, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let use_color = console::Term::stdout().features().colors_supported();
    let mut stdout = std::io::stdout().lock();
    execute(&cli, &mut stdout, use_color)
}
