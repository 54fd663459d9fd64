use clap::Parser;
use ospx_cli::options::CaseBuilderOptions;

fn main() -> anyhow::Result<()> {
    let options = CaseBuilderOptions::parse();
    let _logger = ospx_cli::init_logging(&options.logging)?;
    ospx_cli::case_builder(options)
}
