use clap::Parser;
use tracing_subscriber::EnvFilter;

use tblg::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("tblg=debug,info")
    } else {
        EnvFilter::new("tblg=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Genotype(args) => {
            cli::genotype::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Barcode(args) => {
            cli::barcode::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
