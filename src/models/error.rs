use serde::Serialize;
use thiserror::Error;

/// Erreurs de lecture du manifeste et de generation du DAMDFE
#[derive(Error, Debug)]
pub enum DamdfeError {
    #[error("XML invalide: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Element obligatoire absent: {0}")]
    MissingElement(&'static str),

    #[error("Attribut {attribute} absent sur l'element {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Code {value:?} inconnu pour {field}")]
    UnknownCode { field: &'static str, value: String },

    #[error("Date invalide pour {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Nombre invalide pour {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Erreur code-barres: {0}")]
    Barcode(String),

    #[error("Erreur QR code: {0}")]
    QrCode(#[from] qrcode::types::QrError),

    #[error("Erreur police: {0}")]
    Font(String),

    #[error("Erreur generation PDF: {0}")]
    Pdf(String),

    #[error("Erreur E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration invalide: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Erreur template: {0}")]
    Template(#[from] tera::Error),
}

impl DamdfeError {
    /// Vrai si l'erreur vient du contenu du XML (et non du moteur de rendu)
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DamdfeError::Xml(_)
                | DamdfeError::MissingElement(_)
                | DamdfeError::MissingAttribute { .. }
                | DamdfeError::UnknownCode { .. }
                | DamdfeError::InvalidDate { .. }
                | DamdfeError::InvalidNumber { .. }
                | DamdfeError::Barcode(_)
                | DamdfeError::QrCode(_)
        )
    }
}

/// Erreur rattachee a un champ du formulaire (`xml`, ou `_form` pour une
/// erreur du moteur de rendu)
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Corps JSON des reponses 400/500 de `POST /damdfe`
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub success: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResponse {
    /// Reponse d'echec; `success` est toujours faux
    pub fn with_errors(errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_names_the_field() {
        let body = ValidationResponse::with_errors(vec![FieldError::new("xml", "XML invalide")]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "errors": [{ "field": "xml", "message": "XML invalide" }]
            })
        );
    }

    #[test]
    fn render_failures_are_not_input_errors() {
        assert!(!DamdfeError::Font("absente".to_string()).is_input_error());
        assert!(DamdfeError::MissingElement("infMDFe").is_input_error());
    }
}
