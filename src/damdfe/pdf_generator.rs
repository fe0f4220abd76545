//! Generateur PDF du DAMDFE
//!
//! Utilise krilla pour serialiser la liste d'operations produite par la mise
//! en page: polices TrueType embarquees (celles qui ont servi a mesurer le
//! texte), traits de 0,2 mm, filigrane tourne et logo PNG/JPEG optionnel.

use krilla::color::rgb;
use krilla::geom::{PathBuilder, Point, Rect, Size, Transform};
use krilla::image::Image;
use krilla::metadata::Metadata;
use krilla::page::PageSettings;
use krilla::paint::{Fill, Paint, Stroke};
use krilla::surface::Surface;
use krilla::text::{Font, TextDirection};
use krilla::Document;
use std::path::Path;

use super::canvas::{DrawOp, FontStyle, Page, Rgb, Rotation, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::fonts::FontSet;
use crate::models::error::DamdfeError;

/// 1 mm en points (1pt = 1/72 inch)
const MM_TO_PT: f32 = 72.0 / 25.4;
const STROKE_WIDTH_MM: f32 = 0.2;

fn pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// Polices krilla construites a partir des octets deja mesures
struct PdfFonts {
    regular: Font,
    bold: Font,
}

impl PdfFonts {
    fn new(fonts: &FontSet) -> Result<Self, DamdfeError> {
        let build = |style: FontStyle| {
            Font::new(fonts.get(style).data().into(), 0)
                .ok_or_else(|| DamdfeError::Font(format!("police {:?} refusee par krilla", style)))
        };
        Ok(PdfFonts {
            regular: build(FontStyle::Regular)?,
            bold: build(FontStyle::Bold)?,
        })
    }

    fn get(&self, style: FontStyle) -> &Font {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

/// Serialise les pages du DAMDFE en PDF
pub fn generate_damdfe_pdf(
    pages: &[Page],
    fonts: &FontSet,
    emitter_name: &str,
) -> Result<Vec<u8>, DamdfeError> {
    let fonts = PdfFonts::new(fonts)?;

    let mut doc = Document::new();
    let mut metadata = Metadata::new().title("DAMDFE".to_string());
    if !emitter_name.is_empty() {
        metadata = metadata.creator(emitter_name.to_string());
    }
    doc.set_metadata(metadata);

    for page in pages {
        let page_settings = PageSettings::new(pt(PAGE_WIDTH_MM), pt(PAGE_HEIGHT_MM));
        let mut pdf_page = doc.start_page_with(page_settings);
        let mut surface = pdf_page.surface();

        for op in &page.ops {
            draw_op(&mut surface, op, &fonts)?;
        }

        // Terminer la surface et la page
        surface.finish();
        pdf_page.finish();
    }

    doc.finish()
        .map_err(|e| DamdfeError::Pdf(format!("{:?}", e)))
}

fn fill(color: Rgb) -> Fill {
    Fill {
        paint: Paint::from(rgb::Color::new(color.0, color.1, color.2)),
        ..Default::default()
    }
}

fn black_stroke() -> Stroke {
    Stroke {
        paint: Paint::from(rgb::Color::new(0, 0, 0)),
        width: pt(STROKE_WIDTH_MM),
        ..Default::default()
    }
}

fn draw_op(surface: &mut Surface, op: &DrawOp, fonts: &PdfFonts) -> Result<(), DamdfeError> {
    match op {
        DrawOp::Line { x1, y1, x2, y2 } => {
            let mut builder = PathBuilder::new();
            builder.move_to(pt(*x1), pt(*y1));
            builder.line_to(pt(*x2), pt(*y2));
            stroke_path(surface, builder);
        }
        DrawOp::Rect { x, y, w, h } => {
            if let Some(rect) = Rect::from_xywh(pt(*x), pt(*y), pt(*w), pt(*h)) {
                let mut builder = PathBuilder::new();
                builder.push_rect(rect);
                stroke_path(surface, builder);
            }
        }
        DrawOp::Fill { x, y, w, h } => {
            if let Some(rect) = Rect::from_xywh(pt(*x), pt(*y), pt(*w), pt(*h)) {
                let mut builder = PathBuilder::new();
                builder.push_rect(rect);
                if let Some(path) = builder.finish() {
                    surface.set_stroke(None);
                    surface.set_fill(Some(fill((0, 0, 0))));
                    surface.draw_path(&path);
                }
            }
        }
        DrawOp::Text {
            x,
            baseline,
            text,
            style,
            size,
            color,
            rotation,
        } => {
            surface.set_stroke(None);
            surface.set_fill(Some(fill(*color)));
            if let Some(rotation) = rotation {
                surface.push_transform(&rotation_transform(rotation));
            }
            surface.draw_text(
                Point::from_xy(pt(*x), pt(*baseline)),
                fonts.get(*style).clone(),
                *size,
                text,
                false,
                TextDirection::Auto,
            );
            if rotation.is_some() {
                surface.pop();
            }
        }
        DrawOp::Image { path, x, y, w, h } => draw_image(surface, path, *x, *y, *w, *h)?,
    }
    Ok(())
}

fn stroke_path(surface: &mut Surface, builder: PathBuilder) {
    if let Some(path) = builder.finish() {
        surface.set_fill(None);
        surface.set_stroke(Some(black_stroke()));
        surface.draw_path(&path);
    }
}

/// Matrice (sx, ky, kx, sy, tx, ty) d'une rotation dans le sens
/// trigonometrique autour de (cx, cy), en points, axe y vers le bas
fn rotation_matrix(rotation: &Rotation) -> [f32; 6] {
    let (sin, cos) = rotation.angle.to_radians().sin_cos();
    let (cx, cy) = (pt(rotation.cx), pt(rotation.cy));
    [
        cos,
        -sin,
        sin,
        cos,
        cx - cos * cx - sin * cy,
        cy + sin * cx - cos * cy,
    ]
}

fn rotation_transform(rotation: &Rotation) -> Transform {
    let [sx, ky, kx, sy, tx, ty] = rotation_matrix(rotation);
    Transform::from_row(sx, ky, kx, sy, tx, ty)
}

/// Position et taille (mm) d'une image de `img_w` x `img_h` pixels centree
/// dans le cadre (x, y, w, h) en conservant ses proportions
fn fit_in_box(img_w: u32, img_h: u32, x: f32, y: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let scale = (w / img_w.max(1) as f32).min(h / img_h.max(1) as f32);
    let (draw_w, draw_h) = (img_w as f32 * scale, img_h as f32 * scale);
    (x + (w - draw_w) / 2.0, y + (h - draw_h) / 2.0, draw_w, draw_h)
}

/// Logo ajuste dans son cadre
fn draw_image(
    surface: &mut Surface,
    path: &Path,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
) -> Result<(), DamdfeError> {
    let bytes = std::fs::read(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let image = match extension.as_str() {
        "png" => Image::from_png(bytes.into(), true),
        "jpg" | "jpeg" => Image::from_jpeg(bytes.into(), true),
        other => {
            return Err(DamdfeError::Pdf(format!(
                "format de logo non supporte: {:?}",
                other
            )))
        }
    }
    .ok_or_else(|| DamdfeError::Pdf(format!("logo illisible: {}", path.display())))?;

    let (img_w, img_h) = image.size();
    let (draw_x, draw_y, draw_w, draw_h) = fit_in_box(img_w, img_h, x, y, w, h);
    let size = Size::from_wh(pt(draw_w), pt(draw_h))
        .ok_or_else(|| DamdfeError::Pdf("taille de logo invalide".to_string()))?;

    surface.push_transform(&Transform::from_translate(pt(draw_x), pt(draw_y)));
    surface.draw_image(image, size);
    surface.pop();
    Ok(())
}
