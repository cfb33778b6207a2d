// ==========================================
// Sistema de Gestão Escolar - Motor de Transformações
// ==========================================
// Responsabilidade: transformações declarativas de valor aplicadas
// ao preparar os dados mapeados (uma única vez, não reaplicadas)
// ==========================================

use crate::domain::record::CellValue;
use crate::domain::types::TransformKind;
use chrono::NaiveDate;

/// Aplica uma transformação a um valor de célula.
///
/// Função pura: entrada nula passa inalterada qualquer que seja a
/// transformação; `date_br_to_iso` deixa passar sem erro valores que
/// não tenham a forma `DD/MM/AAAA` (o validador sinaliza o warning).
pub fn apply(value: &CellValue, kind: TransformKind) -> CellValue {
    if matches!(value, CellValue::Null) {
        return CellValue::Null;
    }

    match kind {
        TransformKind::Uppercase => CellValue::Text(value.as_text().to_uppercase()),
        TransformKind::Lowercase => CellValue::Text(value.as_text().to_lowercase()),
        TransformKind::Trim => CellValue::Text(value.as_text().trim().to_string()),
        TransformKind::CpfFormat | TransformKind::PhoneFormat => {
            CellValue::Text(strip_non_digits(&value.as_text()))
        }
        TransformKind::DateBrToIso => CellValue::Text(date_br_to_iso(&value.as_text())),
        TransformKind::Boolean => CellValue::Bool(parse_boolean(&value.as_text())),
    }
}

/// Remove todos os caracteres não numéricos (CPF, telefone)
fn strip_non_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Reinterpreta `DD/MM/AAAA` como `AAAA-MM-DD`; qualquer outra forma
/// passa inalterada
fn date_br_to_iso(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => value.to_string(),
    }
}

/// {"sim", "true", "1", "yes"} (sem distinção de caixa) → true;
/// qualquer outro valor → false
fn parse_boolean(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "sim" | "true" | "1" | "yes"
    )
}
