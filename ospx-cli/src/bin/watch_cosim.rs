use clap::Parser;
use ospx_cli::options::WatchOptions;

fn main() -> anyhow::Result<()> {
    let options = WatchOptions::parse();
    let _logger = ospx_cli::init_logging(&options.logging)?;
    ospx_cli::watch(options)
}
