//! CLI entrypoint for `pkl-builtins-gen`.

use std::io::Write;

use clap::Parser;
use pkl_builtins_gen::cli::Args;
use pkl_builtins_gen::{GenConfig, GenError, generate, logging};

fn main() -> Result<(), GenError> {
    logging::init();
    run()
}

fn run() -> Result<(), GenError> {
    let args = Args::parse();
    let config = GenConfig::load(&args)?;
    let report = generate(&config)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", report.metadata_path)
        .map_err(|err| GenError::io(report.metadata_path.clone(), err))?;
    Ok(())
}
