//! Surface de dessin a curseur, en millimetres, origine en haut a gauche
//!
//! Le canvas ne produit qu'une liste d'operations par page; la conversion en
//! PDF est faite par `pdf_generator`.

use std::path::PathBuf;

use super::fonts::FontSet;
use crate::config::Margins;

pub const PAGE_WIDTH_MM: f32 = 210.0; // A4
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const PT_TO_MM: f32 = 25.4 / 72.0;
/// Marge interieure gauche et droite d'une cellule de texte
pub const CELL_PADDING: f32 = 1.0;

pub type Rgb = (u8, u8, u8);
pub const BLACK: Rgb = (0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Rotation (degres, sens trigonometrique) autour d'un point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub angle: f32,
    pub cx: f32,
    pub cy: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    /// Rectangle trace (contour seulement)
    Rect { x: f32, y: f32, w: f32, h: f32 },
    /// Rectangle plein noir (barres, modules QR)
    Fill { x: f32, y: f32, w: f32, h: f32 },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        style: FontStyle,
        /// Taille en points
        size: f32,
        color: Rgb,
        rotation: Option<Rotation>,
    },
    Image {
        path: PathBuf,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Textes de la page, dans l'ordre de dessin
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub struct Canvas<'a> {
    fonts: &'a FontSet,
    margins: Margins,
    x: f32,
    y: f32,
    style: FontStyle,
    size: f32,
    color: Rgb,
    pages: Vec<Page>,
}

impl<'a> Canvas<'a> {
    pub fn new(fonts: &'a FontSet, margins: Margins) -> Self {
        Self {
            fonts,
            margins,
            x: margins.left,
            y: margins.top,
            style: FontStyle::Regular,
            size: 7.0,
            color: BLACK,
            pages: Vec::new(),
        }
    }

    /// Ouvre une nouvelle page et replace le curseur en haut a gauche
    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.x = self.margins.left;
        self.y = self.margins.top;
    }

    pub fn l_margin(&self) -> f32 {
        self.margins.left
    }

    pub fn t_margin(&self) -> f32 {
        self.margins.top
    }

    pub fn r_margin(&self) -> f32 {
        self.margins.right
    }

    /// Largeur utile entre les marges
    pub fn epw(&self) -> f32 {
        PAGE_WIDTH_MM - self.margins.left - self.margins.right
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.style = style;
        self.size = size;
    }

    pub fn set_text_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Largeur du texte dans la police courante, en mm
    pub fn string_width(&self, text: &str) -> f32 {
        self.fonts.get(self.style).text_width(text, self.size)
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push(DrawOp::Line { x1, y1, x2, y2 });
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.push(DrawOp::Rect { x, y, w, h });
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.push(DrawOp::Fill { x, y, w, h });
    }

    pub fn image(&mut self, path: PathBuf, x: f32, y: f32, w: f32, h: f32) {
        self.push(DrawOp::Image { path, x, y, w, h });
    }

    /// Texte pose directement sur sa ligne de base, avec rotation optionnelle
    pub fn text_at(&mut self, x: f32, baseline: f32, text: &str, rotation: Option<Rotation>) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            baseline,
            text: text.to_string(),
            style: self.style,
            size: self.size,
            color: self.color,
            rotation,
        });
    }

    /// Decoupe `text` en lignes tenant dans `max_width`
    ///
    /// Les coupures se font sur les espaces; les espaces interieurs d'une
    /// ligne sont conserves tels quels, ceux d'une coupure sont supprimes.
    pub fn wrap_lines(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut gap = String::new();
            let mut first_line = true;
            for piece in paragraph.split_inclusive(' ') {
                let word = piece.trim_end_matches(' ');
                if word.is_empty() {
                    gap.push_str(piece);
                    continue;
                }
                let trailing = &piece[word.len()..];

                let candidate = if !current.is_empty() {
                    format!("{}{}{}", current, gap, word)
                } else if first_line {
                    format!("{}{}", gap, word)
                } else {
                    word.to_string()
                };
                gap = trailing.to_string();
                if self.string_width(&candidate) <= max_width {
                    current = candidate;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    first_line = false;
                }
                // Un mot trop long est coupe au caractere
                for c in word.chars() {
                    current.push(c);
                    if self.string_width(&current) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        first_line = false;
                        current.push(c);
                    }
                }
            }
            lines.push(current);
        }
        lines
    }

    /// Cellule de texte multiligne a la position du curseur
    ///
    /// Chaque ligne occupe `h` mm; le curseur descend d'autant de lignes.
    pub fn text_cell(&mut self, w: f32, h: f32, text: &str, align: Align) {
        let (x0, y0) = (self.x, self.y);
        let size_mm = self.size * PT_TO_MM;
        let lines = self.wrap_lines(text, w - 2.0 * CELL_PADDING);

        for (i, line) in lines.iter().enumerate() {
            let width = self.string_width(line);
            let x = match align {
                Align::Left => x0 + CELL_PADDING,
                Align::Center => x0 + (w - width) / 2.0,
                Align::Right => x0 + w - CELL_PADDING - width,
            };
            let baseline = y0 + i as f32 * h + 0.5 * h + 0.3 * size_mm;
            self.text_at(x, baseline, line, None);
        }

        self.x = x0 + w;
        self.y = y0 + lines.len() as f32 * h;
    }

    /// Raccourci: deplace le curseur puis ecrit une cellule
    pub fn text_cell_at(&mut self, x: f32, y: f32, w: f32, h: f32, text: &str, align: Align) {
        self.set_xy(x, y);
        self.text_cell(w, h, text, align);
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damdfe::fonts::test_fonts;

    fn canvas(fonts: &FontSet) -> Canvas<'_> {
        let mut canvas = Canvas::new(fonts, Margins::default());
        canvas.add_page();
        canvas
    }

    #[test]
    fn effective_width_follows_margins() {
        let fonts = test_fonts();
        let canvas = Canvas::new(
            &fonts,
            Margins {
                left: 10.0,
                right: 7.0,
                ..Margins::default()
            },
        );
        assert_eq!(canvas.epw(), 193.0);
    }

    #[test]
    fn cell_advances_cursor_by_line_count() {
        let fonts = test_fonts();
        let mut canvas = canvas(&fonts);
        canvas.set_font(FontStyle::Regular, 7.0);
        canvas.text_cell_at(30.0, 10.0, 60.0, 3.0, "LINHA 1\nLINHA 2\nLINHA 3", Align::Left);
        assert!((canvas.y() - 19.0).abs() < 1e-4);
        assert!((canvas.x() - 90.0).abs() < 1e-4);

        let texts: Vec<_> = canvas.finish()[0].texts().map(str::to_string).collect();
        assert_eq!(texts, vec!["LINHA 1", "LINHA 2", "LINHA 3"]);
    }

    #[test]
    fn zero_height_cell_keeps_cursor() {
        let fonts = test_fonts();
        let mut canvas = canvas(&fonts);
        canvas.text_cell_at(5.0, 40.0, 100.0, 0.0, "VEÍCULOS", Align::Center);
        assert_eq!(canvas.y(), 40.0);
    }

    #[test]
    fn empty_text_still_takes_one_line() {
        let fonts = test_fonts();
        let mut canvas = canvas(&fonts);
        canvas.text_cell_at(5.0, 40.0, 100.0, 3.0, "", Align::Left);
        assert_eq!(canvas.y(), 43.0);
        assert_eq!(canvas.finish()[0].ops.len(), 0);
    }

    #[test]
    fn long_text_wraps_within_width() {
        let fonts = test_fonts();
        let mut canvas = canvas(&fonts);
        canvas.set_font(FontStyle::Regular, 6.0);
        let text = "OBSERVACAO ".repeat(20);
        let lines = canvas.wrap_lines(text.trim(), 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(canvas.string_width(line) <= 40.0);
            assert!(!line.starts_with(' ') && !line.ends_with(' '));
        }

        let digits = "1".repeat(120);
        let broken = canvas.wrap_lines(&digits, 20.0);
        assert!(broken.len() > 1);
        assert_eq!(broken.concat(), digits);
    }

    #[test]
    fn inner_spacing_is_kept() {
        let fonts = test_fonts();
        let mut canvas = canvas(&fonts);
        canvas.set_font(FontStyle::Regular, 6.0);

        let line = "APÓLICE: APOL-1  AVERBAÇÃO: AVER-1,   AVER-2";
        assert_eq!(canvas.wrap_lines(line, 190.0), vec![line]);

        // la coupure absorbe les espaces, le reste de la ligne les garde
        let width = canvas.string_width("NOME: SEGURADORA");
        let lines = canvas.wrap_lines("NOME: SEGURADORA  CNPJ:  123", width + 0.1);
        assert_eq!(lines, vec!["NOME: SEGURADORA", "CNPJ:  123"]);
    }

    #[test]
    fn centered_text_uses_font_metrics() {
        let fonts = test_fonts();
        let mut canvas = canvas(&fonts);
        canvas.set_font(FontStyle::Bold, 7.0);
        let width = canvas.string_width("PERCURSO");
        assert_eq!(width, fonts.get(FontStyle::Bold).text_width("PERCURSO", 7.0));

        canvas.text_cell_at(0.0, 0.0, 100.0, 3.0, "PERCURSO", Align::Center);
        match &canvas.finish()[0].ops[0] {
            DrawOp::Text { x, baseline, .. } => {
                assert!((x - (100.0 - width) / 2.0).abs() < 1e-4);
                assert!((baseline - (1.5 + 0.3 * 7.0 * PT_TO_MM)).abs() < 1e-4);
            }
            other => panic!("operation inattendue: {:?}", other),
        }
    }
}
