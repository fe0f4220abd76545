//! Module de generation du DAMDFE
//!
//! Le rendu se fait en trois etapes:
//! - lecture du XML MDF-e vers le modele `Manifest`
//! - mise en page en millimetres (liste d'operations par page), mesuree avec
//!   les polices chargees depuis `fonts_dir`
//! - serialisation PDF avec krilla

pub mod canvas;
pub mod codes;
pub mod fonts;
pub mod format;
pub mod layout;
mod pdf_generator;
mod xml_reader;

pub use fonts::{font_files, FontSet};
pub use layout::layout_damdfe;
pub use pdf_generator::generate_damdfe_pdf;
pub use xml_reader::{parse_manifest, MDFE_NAMESPACE};

use crate::config::DamdfeConfig;
use crate::models::error::DamdfeError;
use crate::models::manifest::Manifest;

/// Genere le PDF du DAMDFE a partir du XML du manifeste
pub fn render_damdfe(xml: &str, config: &DamdfeConfig) -> Result<Vec<u8>, DamdfeError> {
    let manifest = parse_manifest(xml)?;
    let fonts = FontSet::load(&config.fonts_dir, config.font_type)?;
    render_manifest(&manifest, config, &fonts)
}

/// Mise en page et PDF d'un manifeste deja lu, avec des polices deja chargees
pub fn render_manifest(
    manifest: &Manifest,
    config: &DamdfeConfig,
    fonts: &FontSet,
) -> Result<Vec<u8>, DamdfeError> {
    let pages = layout_damdfe(manifest, config, fonts)?;
    let pdf = generate_damdfe_pdf(&pages, fonts, &manifest.emitter.name)?;

    tracing::info!(
        key = %manifest.access_key,
        pages = pages.len(),
        bytes = pdf.len(),
        "DAMDFE genere"
    );
    Ok(pdf)
}
