//! Polices TrueType du document
//!
//! Chargees une seule fois: les chasses lues avec ttf-parser servent a la mise
//! en page, les octets sont ensuite embarques dans le PDF.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::canvas::{FontStyle, PT_TO_MM};
use crate::config::FontType;
use crate::models::error::DamdfeError;

/// Chemins des polices regular et bold pour une famille
pub fn font_files(fonts_dir: &Path, font_type: FontType) -> [PathBuf; 2] {
    let stem = font_type.file_stem();
    [
        fonts_dir.join(format!("{}-Regular.ttf", stem)),
        fonts_dir.join(format!("{}-Bold.ttf", stem)),
    ]
}

/// Une police et ses chasses horizontales (table hmtx) par caractere
pub struct FontFace {
    data: Arc<Vec<u8>>,
    units_per_em: f32,
    advances: HashMap<char, u16>,
    /// Chasse du glyphe .notdef, pour les caracteres absents de la police
    missing_advance: u16,
}

impl FontFace {
    pub fn parse(data: Vec<u8>, origin: &Path) -> Result<Self, DamdfeError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| {
            DamdfeError::Font(format!("police invalide: {} - {}", origin.display(), e))
        })?;

        let mut advances = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|code_point| {
                    let glyph = subtable.glyph_index(code_point);
                    let advance = glyph.and_then(|g| face.glyph_hor_advance(g));
                    if let (Some(c), Some(advance)) = (char::from_u32(code_point), advance) {
                        advances.entry(c).or_insert(advance);
                    }
                });
            }
        }

        let units_per_em = face.units_per_em().max(1) as f32;
        let missing_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(0);
        drop(face);

        Ok(Self {
            data: Arc::new(data),
            units_per_em,
            advances,
            missing_advance,
        })
    }

    pub fn data(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.data)
    }

    /// Largeur de `text` en mm pour une taille en points
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| *self.advances.get(&c).unwrap_or(&self.missing_advance) as u32)
            .sum();
        units as f32 / self.units_per_em * size * PT_TO_MM
    }
}

/// Polices regular et bold de la famille configuree
pub struct FontSet {
    regular: FontFace,
    bold: FontFace,
}

impl FontSet {
    pub fn load(fonts_dir: &Path, font_type: FontType) -> Result<Self, DamdfeError> {
        let [regular_path, bold_path] = font_files(fonts_dir, font_type);

        let read = |path: &Path| {
            let bytes = std::fs::read(path).map_err(|e| {
                DamdfeError::Font(format!("lecture {} - {}", path.display(), e))
            })?;
            FontFace::parse(bytes, path)
        };

        let fonts = FontSet {
            regular: read(&regular_path)?,
            bold: read(&bold_path)?,
        };
        tracing::debug!(dir = %fonts_dir.display(), family = font_type.file_stem(), "polices chargees");
        Ok(fonts)
    }

    pub fn get(&self, style: FontStyle) -> &FontFace {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

/// Polices livrees avec le depot, pour les tests
#[cfg(test)]
pub(crate) fn test_fonts() -> FontSet {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    FontSet::load(&dir, FontType::Times).expect("polices Liberation Serif dans assets/fonts")
}
