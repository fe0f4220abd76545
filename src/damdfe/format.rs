//! Mise en forme des valeurs affichees (dates, montants, documents, telephone)

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::error::DamdfeError;
use crate::models::manifest::DateTimeText;

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// CEP sur 8 chiffres -> 00000-000
pub fn format_cep(cep: &str) -> String {
    let digits = digits_only(cep);
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        cep.to_string()
    }
}

/// Telephone fixe (10 chiffres) ou mobile (11 chiffres) avec indicatif
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        _ => phone.to_string(),
    }
}

/// CPF (11 chiffres) ou CNPJ (14 chiffres)
pub fn format_cpf_cnpj(document: &str) -> String {
    let d = digits_only(document);
    match d.len() {
        11 => format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..]),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        ),
        _ => document.to_string(),
    }
}

/// Format numerique bresilien: 1234.5 -> "1.234,50" (precision 2)
pub fn format_number(value: f64, precision: usize) -> String {
    let fixed = format!("{:.*}", precision, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{},{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Montant optionnel: absent -> chaine vide
pub fn format_optional_number(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format_number(v, precision))
        .unwrap_or_default()
}

/// Lit un decimal XML (point decimal); chaine vide -> None
pub fn parse_decimal(field: &'static str, value: &str) -> Result<Option<f64>, DamdfeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| DamdfeError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Date ISO-8601 -> (dd/mm/YYYY, HH:MM:SS) en UTC
///
/// Une date sans fuseau est consideree comme deja exprimee en UTC.
pub fn split_datetime_utc(field: &'static str, value: &str) -> Result<DateTimeText, DamdfeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(DateTimeText::default());
    }

    let utc = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|_| DamdfeError::InvalidDate {
                field,
                value: value.to_string(),
            })?,
    };

    Ok(DateTimeText {
        date: utc.format("%d/%m/%Y").to_string(),
        time: utc.format("%H:%M:%S").to_string(),
    })
}
