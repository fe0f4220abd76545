//! Mise en page du DAMDFE
//!
//! Les sections sont dessinees dans l'ordre: filigrane, en-tete, corps
//! (ANTT, vehicules, conducteurs), vale-pedagio et composition de la charge,
//! assurances et informations complementaires. Chaque section part de
//! l'origine laissee par la precedente; toutes les positions sont en mm.

use super::canvas::{Align, Canvas, FontStyle, Page, Rotation, BLACK, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::codes::{draw_code128, draw_qr_code};
use super::fonts::FontSet;
use super::format::{format_cep, format_cpf_cnpj, format_number, format_optional_number, format_phone};
use crate::config::DamdfeConfig;
use crate::models::error::DamdfeError;
use crate::models::manifest::{LinkedDocument, Manifest};

pub const TITLE: &str =
    "DAMDFE - Documento Auxiliar do Manifesto de Documentos Fiscais Eletrônicos";
pub const CONSULT_URL: &str = "Consulta em https://dfe-portal.svrs.rs.gov.br/MDFE/Consulta";
pub const WATERMARK: &str = "SEM VALOR FISCAL";
const WATERMARK_COLOR: (u8, u8, u8) = (220, 150, 150);

const HEADER_HEIGHT: f32 = 88.0;
/// Avance du curseur apres chaque section
const HEADER_ADVANCE: f32 = 45.0;
const BODY_ADVANCE: f32 = 32.5;
const VOUCHER_ADVANCE: f32 = 44.5;
/// Hauteur occupee par les assurances et observations sous leur origine
const INSURANCE_HEIGHT: f32 = 130.0;

const QR_SIZE: f32 = 25.0;
const QR_BORDER: usize = 3;
const BARCODE_WIDTH: f32 = 86.18;
const BARCODE_HEIGHT: f32 = 17.0;

const DOC_ROW_HEIGHT: f32 = 4.0;
const CONTINUATION_HEADER: f32 = 20.0;
const ROW_STEP: f32 = 3.25;
pub const MAX_VEHICLE_ROWS: usize = 4;
pub const MAX_DRIVER_ROWS: usize = 4;
pub const MAX_TOLL_ROWS: usize = 3;
pub const MAX_INSURANCE_ROWS: usize = 4;

/// Decalage horizontal du code-barres selon la marge droite
fn barcode_offset(right_margin: f32) -> f32 {
    match right_margin.round().clamp(1.0, 10.0) as u32 {
        1 | 2 => 8.0,
        3 | 4 => 7.0,
        5 | 6 => 6.0,
        7 => 5.5,
        8 => 5.0,
        _ => 4.0,
    }
}

/// Capacite en documents de la premiere page et des pages de continuation
pub fn document_capacity(config: &DamdfeConfig) -> (usize, usize) {
    let margins = config.margins;
    let usable_bottom = PAGE_HEIGHT_MM - margins.bottom;

    let first_rows_start =
        margins.top + HEADER_ADVANCE + BODY_ADVANCE + VOUCHER_ADVANCE + INSURANCE_HEIGHT;
    let first_rows = ((usable_bottom - first_rows_start) / DOC_ROW_HEIGHT).floor().max(0.0);

    let next_rows_start = margins.top + CONTINUATION_HEADER + DOC_ROW_HEIGHT;
    let next_rows = ((usable_bottom - next_rows_start) / DOC_ROW_HEIGHT).floor().max(1.0);

    (2 * first_rows as usize, 2 * next_rows as usize)
}

/// Calcule les pages du DAMDFE a partir du manifeste
///
/// Les largeurs de texte sont mesurees avec `fonts`, qui doit etre la famille
/// embarquee ensuite dans le PDF.
pub fn layout_damdfe(
    manifest: &Manifest,
    config: &DamdfeConfig,
    fonts: &FontSet,
) -> Result<Vec<Page>, DamdfeError> {
    let documents = manifest.linked_documents();
    let (first_capacity, next_capacity) = document_capacity(config);
    let (first_docs, rest) = documents.split_at(first_capacity.min(documents.len()));
    let continuation: Vec<_> = rest.chunks(next_capacity).collect();
    let total_pages = 1 + continuation.len();

    let mut layout = DamdfeLayout::new(manifest, config, fonts, total_pages);

    layout.canvas.add_page();
    layout.draw_void_watermark();
    layout.draw_header()?;
    layout.draw_body_info();
    layout.draw_voucher_information(first_docs);
    layout.draw_insurance_information();

    for (index, docs) in continuation.iter().enumerate() {
        layout.canvas.add_page();
        layout.draw_void_watermark();
        layout.draw_continuation_page(index + 2, docs);
    }

    tracing::debug!(pages = total_pages, documents = documents.len(), "mise en page terminee");
    Ok(layout.canvas.finish())
}

struct DamdfeLayout<'a> {
    manifest: &'a Manifest,
    config: &'a DamdfeConfig,
    canvas: Canvas<'a>,
    total_pages: usize,
    x0: f32,
    /// Largeur des cadres pleine largeur
    full_w: f32,
    /// Demi-largeur utile; `x_mid` est le trait vertical central
    half: f32,
    x_mid: f32,
}

impl<'a> DamdfeLayout<'a> {
    fn new(
        manifest: &'a Manifest,
        config: &'a DamdfeConfig,
        fonts: &'a FontSet,
        total_pages: usize,
    ) -> Self {
        let canvas = Canvas::new(fonts, config.margins);
        let x0 = canvas.l_margin();
        let full_w = canvas.epw() - 0.5;
        let half = full_w / 2.0;
        Self {
            manifest,
            config,
            canvas,
            total_pages,
            x0,
            full_w,
            half,
            x_mid: x0 + half,
        }
    }

    fn hline(&mut self, y: f32) {
        self.canvas.line(self.x0, y, self.x0 + self.full_w, y);
    }

    fn left_hline(&mut self, y: f32) {
        self.canvas.line(self.x0, y, self.x_mid, y);
    }

    fn vlines(&mut self, offsets: &[f32], y1: f32, y2: f32) {
        for offset in offsets {
            let x = self.x0 + offset;
            self.canvas.line(x, y1, x, y2);
        }
    }

    /// Separateurs de colonnes egales dans la moitie gauche
    fn vlines_left(&mut self, y1: f32, y2: f32, columns: usize) {
        let col = self.half / columns as f32;
        for i in 1..=columns {
            let x = self.x0 + i as f32 * col;
            self.canvas.line(x, y1, x, y2);
        }
    }

    fn vlines_right(&mut self, y1: f32, y2: f32, columns: usize) {
        let col = self.half / columns as f32;
        for i in 1..=columns {
            let x = self.x_mid + i as f32 * col;
            self.canvas.line(x, y1, x, y2);
        }
    }

    fn cell(&mut self, x: f32, y: f32, text: &str) {
        self.canvas.text_cell_at(x, y, 100.0, 3.0, text, Align::Left);
    }

    /// Titre de section centre sur un trait horizontal
    fn section_title(&mut self, x: f32, y: f32, w: f32, text: &str) {
        self.canvas.set_font(FontStyle::Bold, 7.0);
        self.canvas.text_cell_at(x, y - 2.0, w, 0.0, text, Align::Center);
    }

    fn draw_void_watermark(&mut self) {
        if self.manifest.has_fiscal_value() {
            return;
        }

        self.canvas.set_font(FontStyle::Bold, 60.0);
        let width = self.canvas.string_width(WATERMARK);
        let height = 15.0;
        let x = (PAGE_WIDTH_MM - width) / 2.0;
        let y = (PAGE_HEIGHT_MM + height) / 2.0;
        let rotation = Rotation {
            angle: 55.0,
            cx: x + width / 2.0,
            cy: y - height / 2.0,
        };

        self.canvas.set_text_color(WATERMARK_COLOR);
        self.canvas.text_at(x, y, WATERMARK, Some(rotation));
        self.canvas.set_text_color(BLACK);
    }

    fn emitter_block(&self) -> String {
        let emit = &self.manifest.emitter;
        let digits = emit.document.chars().filter(|c| c.is_ascii_digit()).count();
        let document_label = if digits == 11 { "CPF" } else { "CNPJ" };
        format!(
            "{}\n{} {}\n{} {}\n{} - {}\n{}:{} IE:{}\nRNTRC:{} TELEFONE:{}",
            emit.name,
            emit.street,
            emit.number,
            emit.district,
            format_cep(&emit.cep),
            emit.city,
            emit.uf,
            document_label,
            format_cpf_cnpj(&emit.document),
            emit.ie,
            self.manifest.road.rntrc,
            format_phone(&emit.phone),
        )
    }

    fn draw_header(&mut self) -> Result<(), DamdfeError> {
        let x0 = self.x0;
        let y0 = self.canvas.y();
        let manifest = self.manifest;
        let ide = &manifest.identification;

        self.canvas.set_font(FontStyle::Regular, 7.0);
        self.canvas.rect(x0, y0, self.full_w, HEADER_HEIGHT);

        if let Some(logo) = &self.config.logo {
            self.canvas.image(logo.clone(), x0 + 2.0, y0 + 2.0, 20.0, 20.0);
        }
        let emitter = self.emitter_block();
        self.canvas
            .text_cell_at(x0 + 25.0, y0 + 5.0, 60.0, 3.0, &emitter, Align::Left);

        self.canvas.line(self.x_mid, y0, self.x_mid, y0 + HEADER_HEIGHT);

        let y = y0 + 25.0;
        self.left_hline(y);
        self.canvas
            .text_cell_at(x0, y, self.half, 3.0, TITLE, Align::Center);

        // Identification du manifeste
        let y = y0 + 28.0;
        self.hline(y);
        self.canvas.set_font(FontStyle::Regular, 6.0);
        self.vlines(&[13.0, 21.0, 32.0, 38.0, 58.0, 73.0], y, y + 7.0);

        let page = format!("1/{}", self.total_pages);
        let issued = ide.issued_at.joined();
        let rows: [(f32, &str, f32, &str); 7] = [
            (1.0, "MODELO", 4.0, &ide.model),
            (13.0, "SÉRIE", 15.0, &ide.series),
            (21.0, "NÚMERO", 24.0, &ide.number),
            (33.0, "FL", 33.0, &page),
            (39.0, "DATA E HORA", 38.0, &issued),
            (59.0, "UF CARREG", 63.0, &ide.loading_uf),
            (77.0, "UF DESCARREG", 84.0, &ide.unloading_uf),
        ];
        for (label_x, label, value_x, value) in rows {
            self.cell(x0 + label_x, y, label);
            self.cell(x0 + value_x, y + 3.0, value);
        }

        // Controle du fisc: QR code, code-barres, chave et protocole
        if manifest.qr_code.is_empty() {
            tracing::warn!(key = %manifest.access_key, "qrCodMDFe absent, QR code omis");
        } else {
            let qr_x = self.x_mid + (self.half - QR_SIZE) / 2.0;
            draw_qr_code(
                &mut self.canvas,
                &manifest.qr_code,
                qr_x,
                y0 + 1.5,
                QR_SIZE,
                QR_BORDER,
            )?;
        }

        self.canvas.set_font(FontStyle::Regular, 6.5);
        self.cell(self.x_mid + 0.25, y, "CONTROLE DO FISCO");
        let barcode_x = self.x_mid + barcode_offset(self.canvas.r_margin());
        let barcode_y = self.canvas.t_margin() + 32.0;
        draw_code128(
            &mut self.canvas,
            &manifest.access_key,
            barcode_x,
            barcode_y,
            BARCODE_WIDTH,
            BARCODE_HEIGHT,
        )?;

        self.cell(self.x_mid + 25.0, y + 23.0, CONSULT_URL);
        self.canvas.set_font(FontStyle::Bold, 7.0);
        self.cell(self.x_mid + 25.0, y + 28.0, &manifest.access_key);
        self.canvas.set_font(FontStyle::Bold, 6.0);
        self.cell(self.x_mid + 28.0, y + 32.0, "PROTOCOLO DE AUTORIZAÇÃO DE USO");
        self.canvas.set_font(FontStyle::Regular, 6.0);
        let protocol = manifest
            .protocol
            .as_ref()
            .map(|p| format!("{} {}", p.number, p.received_at.joined()).trim().to_string())
            .unwrap_or_default();
        self.cell(self.x_mid + 32.0, y + 35.0, &protocol);

        // Emission
        let y = y0 + 35.0;
        self.left_hline(y);
        self.vlines(&[24.0, 64.0], y, y + 7.0);
        let trip_start = ide.trip_start.joined();
        self.cell(x0, y, "FORMA DE EMISSÃO");
        self.cell(x0 + 6.0, y + 3.0, ide.emission_type.label());
        self.cell(x0 + 25.0, y, "PREVISÃO DE INICIO DA VIAGEM");
        self.cell(x0 + 32.5, y + 3.0, &trip_start);
        self.cell(x0 + 73.0, y, "INSC. SUFRAMA");

        // Emetteur et environnement
        let y = y0 + 42.0;
        self.left_hline(y);
        self.vlines(&[44.0, 70.0], y, y + 8.0);
        self.cell(x0 + 11.0, y, "TIPO DO EMITENTE");
        self.canvas
            .text_cell_at(x0 + 0.5, y + 3.0, 44.0, 2.5, ide.emitter_type.label(), Align::Left);
        self.cell(x0 + 46.0, y, "TIPO DO AMBIENTE");
        self.cell(x0 + 50.0, y + 3.0, ide.environment.label());
        self.cell(x0 + 73.0, y, "CARGA POSTERIOR");
        let later = if ide.later_loading { "SIM" } else { "NÃO" };
        self.cell(x0 + 80.0, y + 3.0, later);

        self.hline(y0 + 50.0);

        self.canvas.set_xy(x0, y0 + HEADER_ADVANCE);
        tracing::debug!(y = y0, "en-tete dessine");
        Ok(())
    }

    fn draw_body_info(&mut self) {
        let x0 = self.x0;
        let y0 = self.canvas.y();
        let quantity_precision = self.config.decimal.quantity_precision;
        let manifest = self.manifest;
        let totals = &manifest.totals;
        let road = &manifest.road;

        let y = y0 + 10.0;
        self.left_hline(y);
        self.section_title(x0, y, self.half, "MODAL RODOVIÁRIO DE CARGA");

        // Informations ANTT
        let y = y0 + 15.0;
        self.hline(y);
        self.section_title(x0, y, self.half, "INFORMAÇÕES PARA ANTT");
        self.vlines_left(y, y + 7.0, 4);
        self.canvas.set_font(FontStyle::Regular, 6.5);
        let weight = format_optional_number(totals.cargo_weight, quantity_precision);
        let value = totals
            .cargo_value
            .map(|v| format!("R$ {}", format_number(v, 2)))
            .unwrap_or_default();
        let antt: [(&str, &str); 4] = [
            ("QTD. CT-e", &totals.cte_count),
            ("QTD. NF-e", &totals.nfe_count),
            ("PESO TOTAL", &weight),
            ("VALOR TOTAL", &value),
        ];
        for (i, (label, content)) in antt.iter().enumerate() {
            let x = x0 + 25.0 * i as f32;
            self.cell(x, y, label);
            self.cell(x, y + 3.0, content);
        }

        self.hline(y0 + 22.0);

        // Vehicules (moitie gauche)
        let y = y0 + 26.0;
        self.hline(y);
        self.section_title(x0, y, self.half, "VEÍCULOS");
        self.vlines_left(y, y + 17.0, 4);
        let labels = ["PLACA", "UF", "RNTRC", "RENAVAM"];
        for (i, label) in labels.iter().enumerate() {
            self.canvas.set_font(FontStyle::Bold, 7.0);
            self.cell(x0 + 25.0 * i as f32, y, label);
        }
        if road.vehicles.len() > MAX_VEHICLE_ROWS {
            tracing::warn!(
                count = road.vehicles.len(),
                shown = MAX_VEHICLE_ROWS,
                "vehicules tronques"
            );
        }
        self.canvas.set_font(FontStyle::Regular, 7.0);
        for (row, vehicle) in road.vehicles.iter().take(MAX_VEHICLE_ROWS).enumerate() {
            let vy = y + 4.0 + row as f32 * ROW_STEP;
            let values = [&vehicle.plate, &vehicle.uf, &vehicle.rntrc, &vehicle.renavam];
            for (i, content) in values.iter().enumerate() {
                self.cell(x0 + 25.0 * i as f32, vy, content);
            }
        }

        // Conducteurs (moitie droite)
        self.section_title(self.x_mid, y, self.half, "CONDUTORES");
        self.hline(y0 + 29.0);
        self.vlines_right(y, y + 17.0, 2);
        let name_x = self.x_mid + self.half / 2.0 + 0.4;
        self.canvas.set_font(FontStyle::Regular, 7.0);
        self.cell(self.x_mid + 0.25, y + 0.2, "CPF");
        self.cell(name_x, y + 0.2, "CONDUTORES");
        if road.drivers.len() > MAX_DRIVER_ROWS {
            tracing::warn!(
                count = road.drivers.len(),
                shown = MAX_DRIVER_ROWS,
                "conducteurs tronques"
            );
        }
        for (row, driver) in road.drivers.iter().take(MAX_DRIVER_ROWS).enumerate() {
            let dy = y + 3.5 + row as f32 * ROW_STEP;
            self.cell(self.x_mid + 0.25, dy, &format_cpf_cnpj(&driver.cpf));
            self.canvas
                .text_cell_at(name_x, dy, self.half / 2.0, 3.0, &driver.name, Align::Left);
        }

        self.hline(y0 + 60.0);

        self.canvas.set_xy(x0, y0 + BODY_ADVANCE);
        tracing::debug!(y = y0, "corps dessine");
    }

    fn draw_voucher_information(&mut self, documents: &[(&str, &LinkedDocument)]) {
        let x0 = self.x0;
        let y0 = self.canvas.y();
        let price_precision = self.config.decimal.price_precision;
        let manifest = self.manifest;

        self.canvas.rect(x0, y0 + 10.5, self.full_w, 30.0);

        // Vale-pedagio
        let y = y0 + 14.5;
        self.hline(y);
        self.section_title(x0, y, self.full_w, "INFORMAÇÕES DE VALE PEDÁGIO");
        self.vlines_left(y, y + 4.0, 2);
        self.vlines_right(y, y + 4.0, 2);
        self.canvas.set_font(FontStyle::Bold, 6.0);
        self.cell(x0 + 12.0, y + 1.0, "CNPJ DA FORNECEDORA");
        self.cell(x0 + 59.0, y + 1.0, "CPF/CNPJ DO RESPONSÁVEL");
        self.cell(self.x_mid + 7.25, y + 1.0, "NÚMERO DO COMPROVANTE");
        self.cell(self.x_mid + 59.25, y + 1.0, "VALOR DO VALE-PEDÁGIO");
        self.hline(y0 + 18.5);

        let tolls = &manifest.road.tolls;
        if tolls.len() > MAX_TOLL_ROWS {
            tracing::warn!(count = tolls.len(), shown = MAX_TOLL_ROWS, "vale-pedagio tronques");
        }
        self.canvas.set_font(FontStyle::Regular, 6.0);
        let col = self.half / 2.0;
        for (row, toll) in tolls.iter().take(MAX_TOLL_ROWS).enumerate() {
            let ty = y0 + 19.0 + row as f32 * 3.5;
            let values = [
                format_cpf_cnpj(&toll.supplier_cnpj),
                format_cpf_cnpj(&toll.payer_document),
                toll.voucher_number.clone(),
                format_optional_number(toll.value, price_precision),
            ];
            for (i, content) in values.iter().enumerate() {
                let x = x0 + col * i as f32;
                self.canvas.text_cell_at(x, ty, col, 3.0, content, Align::Center);
            }
        }

        // Percurso
        let y = y0 + 31.5;
        self.hline(y);
        self.section_title(x0, y, self.full_w, "PERCURSO");
        self.canvas.set_font(FontStyle::Regular, 6.5);
        let route = manifest.identification.route.join(" / ");
        self.canvas
            .text_cell_at(x0, y + 1.5, self.full_w, 0.0, &route, Align::Left);
        self.hline(y0 + 35.5);

        self.draw_document_table(y0 + 40.5, documents);

        let rows = documents.len().div_ceil(2) as f32;
        self.canvas
            .set_xy(x0, y0 + VOUCHER_ADVANCE + rows * DOC_ROW_HEIGHT);
        tracing::debug!(y = y0, documents = documents.len(), "vale-pedagio et documents dessines");
    }

    /// Tableau a deux colonnes (municipio, chave) des documents vinculados
    fn draw_document_table(&mut self, y: f32, documents: &[(&str, &LinkedDocument)]) {
        let x0 = self.x0;
        self.hline(y);
        self.section_title(x0, y, self.full_w, "INFORMAÇÕES DA COMPOSIÇÃO DA CARGA");
        self.vlines(&[30.0, 92.0, 125.0], y, y + 4.0);

        self.canvas.set_font(FontStyle::Regular, 5.5);
        let columns = [
            (0.0, 30.0, "MUNICÍPIO", 30.0, 62.0),
            (92.0, 33.0, "MUNICÍPIO", 125.0, 75.0),
        ];
        for (city_x, _, label, key_x, _) in columns {
            self.cell(x0 + city_x, y + 1.0, label);
            self.cell(
                x0 + key_x,
                y + 1.0,
                "INFORMAÇÕES DOS DOCS. FISCAIS VINCULADOS AO MANIFESTO",
            );
        }

        for (row, pair) in documents.chunks(2).enumerate() {
            let ry = y + DOC_ROW_HEIGHT + row as f32 * DOC_ROW_HEIGHT;
            for ((city, doc), (city_x, city_w, _, key_x, key_w)) in pair.iter().zip(columns) {
                self.canvas
                    .text_cell_at(x0 + city_x, ry, city_w, DOC_ROW_HEIGHT, city, Align::Left);
                self.canvas
                    .text_cell_at(x0 + key_x, ry, key_w, DOC_ROW_HEIGHT, &doc.key, Align::Left);
            }
        }

        let rows = documents.len().div_ceil(2) as f32;
        self.canvas
            .rect(x0, y, self.full_w, DOC_ROW_HEIGHT + rows * DOC_ROW_HEIGHT);
        self.hline(y + DOC_ROW_HEIGHT);
    }

    fn draw_insurance_information(&mut self) {
        let x0 = self.x0;
        let y0 = self.canvas.y();
        let manifest = self.manifest;
        let full_w = self.full_w;

        // Assurances
        self.canvas.rect(x0, y0, full_w, 44.0);
        self.hline(y0 + 4.0);
        self.section_title(x0, y0 + 4.0, full_w, "INFORMAÇÕES SOBRE OS SEGUROS");
        self.canvas.set_font(FontStyle::Regular, 6.0);
        if manifest.insurances.len() > MAX_INSURANCE_ROWS {
            tracing::warn!(
                count = manifest.insurances.len(),
                shown = MAX_INSURANCE_ROWS,
                "assurances tronquees"
            );
        }
        for (row, insurance) in manifest.insurances.iter().take(MAX_INSURANCE_ROWS).enumerate() {
            let iy = y0 + 8.0 + row as f32 * 8.0;
            if !insurance.insurer_name.is_empty() {
                let line = format!(
                    "NOME: {}  CNPJ: {}",
                    insurance.insurer_name,
                    format_cpf_cnpj(&insurance.insurer_cnpj)
                );
                self.canvas
                    .text_cell_at(x0, iy, full_w, 0.0, &line, Align::Left);
            }
            if !insurance.policy.is_empty() {
                let line = format!(
                    "APÓLICE: {}  AVERBAÇÃO: {}",
                    insurance.policy,
                    insurance.endorsements.join(", ")
                );
                self.canvas
                    .text_cell_at(x0, iy + 4.0, full_w, 0.0, &line, Align::Left);
            }
        }

        // Observations du contribuable
        self.canvas.rect(x0, y0 + 40.0, full_w, 45.0);
        self.hline(y0 + 44.0);
        self.section_title(
            x0,
            y0 + 44.0,
            full_w,
            "INFORMAÇÕES COMPLEMENTARES DE INTERESSE DO CONTRIBUINTE",
        );
        self.canvas.set_font(FontStyle::Regular, 6.0);
        self.canvas
            .text_cell_at(x0, y0 + 47.0, full_w, 3.0, &manifest.additional.taxpayer, Align::Left);

        // Observations du fisc
        self.canvas.rect(x0, y0 + 85.0, full_w, 45.0);
        self.hline(y0 + 90.0);
        self.section_title(
            x0,
            y0 + 90.0,
            full_w,
            "INFORMAÇÕES ADICIONAIS DE INTERESSE DO FISCO",
        );
        self.canvas.set_font(FontStyle::Regular, 6.0);
        self.canvas
            .text_cell_at(x0, y0 + 90.0, full_w, 3.0, &manifest.additional.fisco, Align::Left);

        self.canvas.set_xy(x0, y0 + INSURANCE_HEIGHT);
        tracing::debug!(y = y0, "assurances et observations dessinees");
    }

    fn draw_continuation_page(&mut self, page: usize, documents: &[(&str, &LinkedDocument)]) {
        let x0 = self.x0;
        let y0 = self.canvas.t_margin();
        let full_w = self.full_w;

        self.canvas.rect(x0, y0, full_w, 14.0);
        self.canvas.set_font(FontStyle::Bold, 8.0);
        self.canvas.text_cell_at(
            x0,
            y0 + 2.0,
            full_w,
            4.0,
            "DAMDFE - CONTINUAÇÃO DA RELAÇÃO DE DOCUMENTOS",
            Align::Center,
        );
        self.canvas.set_font(FontStyle::Regular, 6.5);
        let key = format!("CHAVE DE ACESSO: {}", self.manifest.access_key);
        self.canvas
            .text_cell_at(x0, y0 + 8.0, full_w, 3.0, &key, Align::Left);
        let folio = format!("FL {}/{}", page, self.total_pages);
        self.canvas
            .text_cell_at(x0, y0 + 8.0, full_w, 3.0, &folio, Align::Right);

        self.draw_document_table(y0 + CONTINUATION_HEADER, documents);
        tracing::debug!(page, documents = documents.len(), "page de continuation dessinee");
    }
}
