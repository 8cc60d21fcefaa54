//! Utilidades de CSV
//!
//! Escapado, BOM y formato decimal fijo para los exports. El BOM UTF-8 al
//! inicio permite que Excel detecte la codificación correctamente.

use rust_decimal::Decimal;

/// Byte-order mark UTF-8 que precede a todo documento exportado
pub const UTF8_BOM: &str = "\u{feff}";

/// Escapar un campo de texto: siempre entre comillas, comillas internas dobladas
pub fn csv_escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Formatear un decimal con una cantidad fija de decimales
pub fn format_fixed(value: Decimal, places: u32) -> String {
    format!("{:.*}", places as usize, value.round_dp(places))
}

/// Armar un documento CSV con BOM a partir de header y filas ya escapadas
pub fn build_document(header: &[&str], rows: Vec<String>) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(","));
    lines.extend(rows);
    format!("{}{}", UTF8_BOM, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_doubles_internal_quotes() {
        assert_eq!(csv_escape("plain"), "\"plain\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn fixed_decimal_places() {
        assert_eq!(format_fixed("18.5".parse().unwrap(), 3), "18.500");
        assert_eq!(format_fixed("630".parse().unwrap(), 2), "630.00");
        assert_eq!(format_fixed(Decimal::ZERO, 2), "0.00");
    }

    #[test]
    fn document_starts_with_bom() {
        let doc = build_document(&["a", "b"], vec!["1,2".to_string()]);
        assert!(doc.starts_with('\u{feff}'));
        assert_eq!(&doc[3..], "a,b\n1,2");
    }
}
