//! Code-barres Code 128 de la chave de acesso et QR code de consultation

use barcoders::sym::code128::Code128;
use qrcode::{Color, EcLevel, QrCode};

use super::canvas::Canvas;
use crate::models::error::DamdfeError;

// Prefixes de jeu de caracteres attendus par barcoders
const CODE128_SET_B: char = 'Ɓ';
const CODE128_SET_C: char = 'Ć';

/// Modules (1 = barre) du Code 128 de `data`
///
/// Le jeu C (paires de chiffres) est utilise quand `data` est une suite de
/// chiffres de longueur paire, comme une chave de 44 chiffres.
pub fn code128_modules(data: &str) -> Result<Vec<u8>, DamdfeError> {
    let numeric = !data.is_empty() && data.len() % 2 == 0 && data.bytes().all(|b| b.is_ascii_digit());
    let set = if numeric { CODE128_SET_C } else { CODE128_SET_B };
    let barcode = Code128::new(format!("{}{}", set, data))
        .map_err(|e| DamdfeError::Barcode(e.to_string()))?;
    Ok(barcode.encode())
}

/// Dessine le Code 128 en barres pleines dans le cadre (x, y, w, h)
pub fn draw_code128(
    canvas: &mut Canvas,
    data: &str,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
) -> Result<(), DamdfeError> {
    let modules = code128_modules(data)?;
    if modules.is_empty() {
        return Ok(());
    }
    let module_width = w / modules.len() as f32;

    let mut i = 0;
    while i < modules.len() {
        if modules[i] == 1 {
            let start = i;
            while i < modules.len() && modules[i] == 1 {
                i += 1;
            }
            canvas.fill_rect(
                x + start as f32 * module_width,
                y,
                (i - start) as f32 * module_width,
                h,
            );
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Matrice du QR code: (cote en modules, modules sombres ligne par ligne)
pub fn qr_modules(data: &str) -> Result<(usize, Vec<bool>), DamdfeError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)?;
    let width = code.width();
    let dark = code
        .to_colors()
        .into_iter()
        .map(|c| c == Color::Dark)
        .collect();
    Ok((width, dark))
}

/// Dessine le QR code dans un carre de cote `size`, marge de `border` modules
pub fn draw_qr_code(
    canvas: &mut Canvas,
    data: &str,
    x: f32,
    y: f32,
    size: f32,
    border: usize,
) -> Result<(), DamdfeError> {
    let (width, dark) = qr_modules(data)?;
    let module = size / (width + 2 * border) as f32;

    for row in 0..width {
        let cells = &dark[row * width..(row + 1) * width];
        let mut col = 0;
        while col < width {
            if !cells[col] {
                col += 1;
                continue;
            }
            let start = col;
            while col < width && cells[col] {
                col += 1;
            }
            canvas.fill_rect(
                x + (border + start) as f32 * module,
                y + (border + row) as f32 * module,
                (col - start) as f32 * module,
                module,
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Margins;
    use crate::damdfe::canvas::DrawOp;
    use crate::damdfe::fonts::test_fonts;

    const KEY: &str = "43240311222333000181580010000000011000000010";

    #[test]
    fn numeric_key_uses_set_c() {
        let set_c = code128_modules(KEY).unwrap();
        let set_b = code128_modules(&format!("{}A", KEY)).unwrap();
        // 22 paires en jeu C contre 45 caracteres en jeu B
        assert!(set_c.len() < set_b.len());
        assert_eq!(set_c[0], 1);
        assert_eq!(*set_c.last().unwrap(), 1);
    }

    #[test]
    fn barcode_bars_stay_inside_frame() {
        let fonts = test_fonts();
        let mut canvas = Canvas::new(&fonts, Margins::default());
        canvas.add_page();
        draw_code128(&mut canvas, KEY, 110.0, 37.0, 86.18, 17.0).unwrap();

        let pages = canvas.finish();
        let bars: Vec<_> = pages[0].ops.iter().collect();
        assert!(!bars.is_empty());
        for op in bars {
            match op {
                DrawOp::Fill { x, y, w, h } => {
                    assert!(*x >= 110.0 - 1e-3 && x + w <= 196.18 + 1e-3);
                    assert_eq!(*y, 37.0);
                    assert_eq!(*h, 17.0);
                }
                other => panic!("operation inattendue: {:?}", other),
            }
        }
    }

    #[test]
    fn qr_code_fits_requested_square() {
        let url = "https://dfe-portal.svrs.rs.gov.br/mdfe/qrCode?chMDFe=43240311222333000181580010000000011000000010&tpAmb=1";
        let (width, dark) = qr_modules(url).unwrap();
        assert_eq!(dark.len(), width * width);

        let fonts = test_fonts();
        let mut canvas = Canvas::new(&fonts, Margins::default());
        canvas.add_page();
        draw_qr_code(&mut canvas, url, 140.0, 6.0, 25.0, 3).unwrap();
        let module = 25.0 / (width + 6) as f32;

        for op in &canvas.finish()[0].ops {
            if let DrawOp::Fill { x, y, w, h } = op {
                assert!(*x >= 140.0 + 3.0 * module - 1e-3);
                assert!(x + w <= 165.0 - 3.0 * module + 1e-3);
                assert!(*y >= 6.0 + 3.0 * module - 1e-3);
                assert!((h - module).abs() < 1e-4);
            }
        }
    }
}
