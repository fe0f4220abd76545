//! Configuration du rendu et du serveur, lue depuis un fichier TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::error::DamdfeError;

/// Fichier de configuration charge par defaut par les binaires
pub const DEFAULT_CONFIG_PATH: &str = "config/damdfe.toml";

/// Configuration complete de l'application
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub layout: DamdfeConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Charge la configuration; un fichier absent donne la configuration par defaut
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DamdfeError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "fichier de configuration absent, valeurs par defaut");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, DamdfeError> {
        Ok(toml::from_str(content)?)
    }
}

/// Parametres de mise en page du DAMDFE
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct DamdfeConfig {
    pub margins: Margins,
    pub font_type: FontType,
    /// Logo de l'emetteur (PNG ou JPEG)
    pub logo: Option<PathBuf>,
    /// Repertoire des polices TrueType embarquees
    pub fonts_dir: PathBuf,
    pub decimal: DecimalConfig,
}

impl Default for DamdfeConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            font_type: FontType::default(),
            logo: None,
            fonts_dir: PathBuf::from("assets/fonts"),
            decimal: DecimalConfig::default(),
        }
    }
}

/// Marges de la page, en millimetres
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 5.0,
            right: 5.0,
            bottom: 5.0,
            left: 5.0,
        }
    }
}

/// Famille de police utilisee pour tout le document
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontType {
    Courier,
    Helvetica,
    #[default]
    Times,
}

impl FontType {
    /// Prefixe des fichiers Liberation correspondant a la famille
    pub fn file_stem(&self) -> &'static str {
        match self {
            FontType::Courier => "LiberationMono",
            FontType::Helvetica => "LiberationSans",
            FontType::Times => "LiberationSerif",
        }
    }
}

/// Nombre de decimales affichees pour les montants et les quantites
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct DecimalConfig {
    pub price_precision: usize,
    pub quantity_precision: usize,
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            price_precision: 4,
            quantity_precision: 4,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: String::from("0.0.0.0:3000"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [layout]
            font_type = "helvetica"

            [layout.margins]
            right = 8.0

            [layout.decimal]
            price_precision = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.layout.font_type, FontType::Helvetica);
        assert_eq!(config.layout.margins.right, 8.0);
        assert_eq!(config.layout.margins.left, 5.0);
        assert_eq!(config.layout.decimal.price_precision, 2);
        assert_eq!(config.layout.decimal.quantity_precision, 4);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn unknown_font_type_is_rejected() {
        let result = AppConfig::from_toml("[layout]\nfont_type = \"comic\"\n");
        assert!(matches!(result, Err(DamdfeError::Config(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.layout.margins, Margins::default());
        assert_eq!(config.layout.font_type, FontType::Times);
    }
}
