#![allow(dead_code)]

use damdfe_render::{DamdfeConfig, FontSet, FontType};
use lopdf::{Document as LopdfDocument, Object};
use std::path::{Path, PathBuf};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const ACCESS_KEY: &str = "43240311222333000181580010000000011000000010";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Manifeste complet autorise en production
pub fn sample_xml() -> String {
    std::fs::read_to_string(fixture("mdfe_proc.xml")).expect("fixture mdfe_proc.xml")
}

/// Variante de l'exemple avec `count` NF-e dans une seule commune de descarga
pub fn xml_with_documents(count: usize) -> String {
    let documents: String = (0..count)
        .map(|i| format!("<infNFe><chNFe>4324039988877700016655001{:019}</chNFe></infNFe>", i))
        .collect();
    let unloading = format!(
        "<infDoc><infMunDescarga><cMunDescarga>3550308</cMunDescarga>\
         <xMunDescarga>SAO PAULO</xMunDescarga>{}</infMunDescarga></infDoc>",
        documents
    );
    let xml = sample_xml();
    let start = xml.find("<infDoc>").expect("infDoc");
    let end = xml.find("</infDoc>").expect("/infDoc") + "</infDoc>".len();
    format!("{}{}{}", &xml[..start], unloading, &xml[end..])
}

/// Remplace la premiere occurrence de `from`
pub fn replace_once(xml: &str, from: &str, to: &str) -> String {
    xml.replacen(from, to, 1)
}

/// Configuration pointant vers les polices Liberation Serif du depot
pub fn test_config() -> DamdfeConfig {
    DamdfeConfig {
        fonts_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"),
        font_type: FontType::Times,
        ..DamdfeConfig::default()
    }
}

pub fn test_fonts() -> FontSet {
    let config = test_config();
    FontSet::load(&config.fonts_dir, config.font_type).expect("polices de test")
}

pub fn load_pdf(bytes: &[u8]) -> Result<LopdfDocument, Box<dyn std::error::Error>> {
    Ok(LopdfDocument::load_mem(bytes)?)
}

/// Entree `/Title` du dictionnaire Info
pub fn info_title(doc: &LopdfDocument) -> Option<String> {
    let dict = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
        object => object.as_dict().ok()?,
    };
    let title = dict.get(b"Title").ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(title).into_owned())
}

/// Nombre d'images (XObject /Image) dans le document
pub fn image_count(doc: &LopdfDocument) -> usize {
    doc.objects
        .values()
        .filter(|object| match object {
            Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false),
            _ => false,
        })
        .count()
}
