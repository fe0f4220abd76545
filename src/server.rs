//! Service HTTP: formulaire d'envoi du XML et generation du DAMDFE

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::config::AppConfig;
use crate::damdfe::{parse_manifest, render_manifest, FontSet};
use crate::models::error::{DamdfeError, FieldError, ValidationResponse};

/// Nom du champ multipart contenant le XML
pub const XML_FIELD: &str = "xml";

pub struct AppState {
    pub config: AppConfig,
    pub tera: Tera,
    /// Polices chargees au demarrage, partagees par toutes les requetes
    pub fonts: FontSet,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, DamdfeError> {
        let fonts = FontSet::load(&config.layout.fonts_dir, config.layout.font_type)?;
        Ok(Self {
            tera: Tera::new("templates/**/*")?,
            fonts,
            config,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/damdfe", post(create_damdfe))
        .with_state(state)
}

fn error_response(status: StatusCode, field: &str, message: impl Into<String>) -> Response {
    let response = ValidationResponse::with_errors(vec![FieldError::new(field, message)]);
    (status, Json(response)).into_response()
}

// Page d'accueil : envoi du XML
async fn index_page(State(state): State<Arc<AppState>>) -> Response {
    let mut context = Context::new();
    context.insert("xml_field", XML_FIELD);
    context.insert("font_type", &state.config.layout.font_type);
    match state.tera.render("index.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "rendu du template impossible");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "_form", "Erreur de template")
        }
    }
}

/// Lit le contenu du champ `xml` du formulaire
async fn read_xml_field(mut multipart: Multipart) -> Result<Option<String>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(XML_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        let xml = String::from_utf8(bytes.to_vec())
            .map_err(|_| "Le fichier XML doit etre encode en UTF-8".to_string())?;
        return Ok(Some(xml));
    }
    Ok(None)
}

fn render_error(error: DamdfeError) -> Response {
    if error.is_input_error() {
        tracing::warn!(error = %error, "XML refuse");
        error_response(StatusCode::BAD_REQUEST, XML_FIELD, error.to_string())
    } else {
        tracing::error!(error = %error, "generation du DAMDFE impossible");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "_form",
            format!("Erreur génération PDF: {}", error),
        )
    }
}

/// Endpoint de generation du DAMDFE
async fn create_damdfe(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let xml = match read_xml_field(multipart).await {
        Ok(Some(xml)) if !xml.trim().is_empty() => xml,
        Ok(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                XML_FIELD,
                "Le fichier XML du MDF-e est obligatoire",
            )
        }
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "_form",
                format!("Erreur de parsing: {}", e),
            )
        }
    };

    let manifest = match parse_manifest(&xml) {
        Ok(manifest) => manifest,
        Err(e) => return render_error(e),
    };

    let pdf = match render_manifest(&manifest, &state.config.layout, &state.fonts) {
        Ok(pdf) => pdf,
        Err(e) => return render_error(e),
    };

    tracing::info!(key = %manifest.access_key, bytes = pdf.len(), "DAMDFE envoye");

    // Nom du fichier PDF
    let filename = format!(
        "damdfe_{}.pdf",
        manifest.access_key.replace(['/', '\\', ' ', '"'], "_")
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        pdf,
    )
        .into_response()
}
