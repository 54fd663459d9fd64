use clap::Parser;
use ospx_cli::options::ImportOptions;

fn main() -> anyhow::Result<()> {
    let options = ImportOptions::parse();
    let _logger = ospx_cli::init_logging(&options.logging)?;
    ospx_cli::import(options)
}
