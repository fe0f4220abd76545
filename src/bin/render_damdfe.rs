//! Generation d'un DAMDFE en ligne de commande
//!
//! Usage: render_damdfe <manifeste.xml> [sortie.pdf] [config.toml]

use damdfe_render::config::{AppConfig, DEFAULT_CONFIG_PATH};
use damdfe_render::logger::init_logger;
use damdfe_render::{render_damdfe, DamdfeError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logger(std::env::var_os("DAMDFE_VERBOSE").is_some());

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: render_damdfe <manifeste.xml> [sortie.pdf] [config.toml]");
        return ExitCode::from(2);
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("pdf"));
    let config_path = args
        .next()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    match run(&input, &output, &config_path) {
        Ok(size) => {
            tracing::info!(output = %output.display(), bytes = size, "PDF genere avec succes");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "ERREUR");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, output: &Path, config_path: &str) -> Result<usize, DamdfeError> {
    let config = AppConfig::load(config_path)?;
    let xml = std::fs::read_to_string(input)?;
    let pdf = render_damdfe(&xml, &config.layout)?;
    std::fs::write(output, &pdf)?;
    Ok(pdf.len())
}
