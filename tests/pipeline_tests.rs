mod common;

use common::*;
use damdfe_render::damdfe::canvas::{DrawOp, Page};
use damdfe_render::damdfe::layout::WATERMARK;
use damdfe_render::models::manifest::{DocumentKind, EmitterType, Environment};
use damdfe_render::{layout_damdfe, parse_manifest, render_damdfe, DamdfeConfig, DamdfeError};
use std::path::PathBuf;

fn has_text(page: &Page, text: &str) -> bool {
    page.texts().any(|t| t == text)
}

#[test]
fn sample_manifest_is_fully_extracted() -> TestResult {
    let manifest = parse_manifest(&sample_xml())?;

    assert_eq!(manifest.access_key, ACCESS_KEY);
    let ide = &manifest.identification;
    assert_eq!(ide.model, "58");
    assert_eq!(ide.environment, Environment::Production);
    assert_eq!(ide.emitter_type, EmitterType::OwnCargoCarrier);
    assert_eq!(ide.issued_at.date, "15/03/2024");
    assert_eq!(ide.issued_at.time, "13:30:00");
    assert_eq!(ide.route, vec!["SC", "PR"]);
    assert!(ide.later_loading);

    assert_eq!(manifest.emitter.name, "TRANSPORTES EXEMPLO LTDA");
    assert_eq!(manifest.road.rntrc, "12345678");
    assert_eq!(manifest.road.vehicles.len(), 2);
    assert_eq!(manifest.road.vehicles[0].rntrc, "12345678");
    assert_eq!(manifest.road.vehicles[1].rntrc, "87654321");
    assert_eq!(manifest.road.drivers[0].name, "JOAO DA SILVA");
    assert_eq!(manifest.road.tolls[0].value, Some(125.5));

    let documents = manifest.linked_documents();
    assert_eq!(documents.len(), 3);
    assert_eq!(documents[0].0, "SAO PAULO");
    assert_eq!(documents[0].1.kind, DocumentKind::Cte);
    assert_eq!(documents[2].0, "CAMPINAS");

    assert_eq!(manifest.insurances[0].endorsements, vec!["AVER-0001", "AVER-0002"]);
    assert_eq!(manifest.additional.taxpayer, "CARGA FRAGIL - MANUSEAR COM CUIDADO");
    assert!(manifest.qr_code.contains("tpAmb=1"));
    assert!(manifest.has_fiscal_value());
    Ok(())
}

#[test]
fn sample_layout_shows_formatted_values() -> TestResult {
    let manifest = parse_manifest(&sample_xml())?;
    let pages = layout_damdfe(&manifest, &test_config(), &test_fonts())?;
    assert_eq!(pages.len(), 1);
    let page = &pages[0];

    assert!(has_text(page, "TRANSPORTES EXEMPLO LTDA"));
    assert!(has_text(page, "CNPJ:11.222.333/0001-81 IE:0960000001"));
    assert!(has_text(page, "RNTRC:12345678 TELEFONE:(51) 3333-4444"));
    assert!(has_text(page, "1/1"));
    assert!(has_text(page, "15/03/2024 13:30:00"));
    assert!(has_text(page, "R$ 152.345,67"));
    assert!(has_text(page, "12.500,5000"));
    assert!(has_text(page, "123.456.789-09"));
    assert!(has_text(page, "SC / PR"));
    assert!(has_text(page, "SIM"));
    assert!(has_text(page, "125,5000"));
    assert!(has_text(page, "943240000012345 15/03/2024 13:31:12"));
    assert!(has_text(page, "43240399888777000166550010000012351000012350"));
    assert!(has_text(page, "APÓLICE: APOL-2024-001  AVERBAÇÃO: AVER-0001, AVER-0002"));
    assert!(!has_text(page, WATERMARK));

    let bars = page
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Fill { .. }))
        .count();
    assert!(bars > 100, "code-barres et QR code attendus, {} rectangles", bars);
    Ok(())
}

#[test]
fn homologation_manifest_is_watermarked() -> TestResult {
    let xml = replace_once(&sample_xml(), "<tpAmb>1</tpAmb>", "<tpAmb>2</tpAmb>");
    let manifest = parse_manifest(&xml)?;
    assert_eq!(manifest.identification.environment, Environment::Homologation);

    let pages = layout_damdfe(&manifest, &test_config(), &test_fonts())?;
    assert!(has_text(&pages[0], WATERMARK));
    assert!(has_text(&pages[0], "Homologação"));
    Ok(())
}

#[test]
fn many_documents_spill_onto_continuation_pages() -> TestResult {
    let config = test_config();
    let fonts = test_fonts();

    let manifest = parse_manifest(&xml_with_documents(16))?;
    assert_eq!(layout_damdfe(&manifest, &config, &fonts)?.len(), 1);

    let manifest = parse_manifest(&xml_with_documents(17))?;
    let pages = layout_damdfe(&manifest, &config, &fonts)?;
    assert_eq!(pages.len(), 2);
    assert!(has_text(&pages[0], "1/2"));
    assert!(has_text(&pages[1], "FL 2/2"));
    assert!(has_text(&pages[1], &format!("CHAVE DE ACESSO: {}", ACCESS_KEY)));

    let manifest = parse_manifest(&xml_with_documents(16 + 130 + 1))?;
    let pages = layout_damdfe(&manifest, &config, &fonts)?;
    assert_eq!(pages.len(), 3);
    assert!(has_text(&pages[2], "FL 3/3"));
    Ok(())
}

#[test]
fn malformed_input_is_rejected_before_rendering() {
    let config = test_config();

    let truncated = sample_xml().replace("</mdfeProc>", "");
    assert!(matches!(
        render_damdfe(&truncated, &config),
        Err(DamdfeError::Xml(_))
    ));

    let bad_date = replace_once(
        &sample_xml(),
        "2024-03-15T10:30:00-03:00",
        "15/03/2024 10:30",
    );
    let err = render_damdfe(&bad_date, &config).unwrap_err();
    assert!(matches!(err, DamdfeError::InvalidDate { field: "dhEmi", .. }));
    assert!(err.is_input_error());
}

#[test]
fn sample_renders_to_pdf() -> TestResult {
    let config = test_config();

    let pdf = render_damdfe(&sample_xml(), &config)?;
    assert!(pdf.starts_with(b"%PDF"));
    let doc = load_pdf(&pdf)?;
    assert_eq!(doc.get_pages().len(), 1);
    assert_eq!(info_title(&doc).as_deref(), Some("DAMDFE"));
    assert_eq!(image_count(&doc), 0);

    let pdf = render_damdfe(&xml_with_documents(40), &config)?;
    assert_eq!(load_pdf(&pdf)?.get_pages().len(), 2);
    Ok(())
}

#[test]
fn logo_is_embedded_in_header() -> TestResult {
    let config = DamdfeConfig {
        logo: Some(fixture("logo.png")),
        ..test_config()
    };

    let pdf = render_damdfe(&sample_xml(), &config)?;
    let doc = load_pdf(&pdf)?;
    assert_eq!(doc.get_pages().len(), 1);
    assert!(image_count(&doc) >= 1);
    Ok(())
}

#[test]
fn missing_logo_is_an_io_error() {
    let config = DamdfeConfig {
        logo: Some(PathBuf::from("/inexistant/logo.png")),
        ..test_config()
    };

    let err = render_damdfe(&sample_xml(), &config).unwrap_err();
    assert!(matches!(err, DamdfeError::Io(_)));
    assert!(!err.is_input_error());
}

#[test]
fn missing_fonts_fail_before_layout() {
    let config = DamdfeConfig {
        fonts_dir: PathBuf::from("/inexistant/polices"),
        ..test_config()
    };

    let err = render_damdfe(&sample_xml(), &config).unwrap_err();
    assert!(matches!(err, DamdfeError::Font(_)));
}

#[test]
fn cli_writes_pdf_next_to_input() -> TestResult {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("manifesto.xml");
    std::fs::write(&input, sample_xml())?;

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_render_damdfe"))
        .arg(&input)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .status()?;
    assert!(status.success());

    let pdf = std::fs::read(dir.path().join("manifesto.pdf"))?;
    assert_eq!(load_pdf(&pdf)?.get_pages().len(), 1);
    Ok(())
}
