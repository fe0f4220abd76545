//! Bibliotheque de generation du DAMDFE (Documento Auxiliar do MDF-e) en PDF

pub mod config;
pub mod damdfe;
pub mod logger;
pub mod models;
pub mod server;

pub use config::{AppConfig, DamdfeConfig, DecimalConfig, FontType, Margins, ServerConfig};
pub use damdfe::{layout_damdfe, parse_manifest, render_damdfe, render_manifest, FontSet};
pub use models::error::DamdfeError;
