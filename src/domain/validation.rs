// ==========================================
// Sistema de Gestão Escolar - Modelo de Validação
// ==========================================
// Regras declarativas por tipo de registro e o resultado por linha.
// Nunca persistido: recalculado a cada mudança de mapeamento/regra.
// ==========================================

use crate::domain::types::{FieldKind, RuleSeverity};
use serde::{Deserialize, Serialize};

// ==========================================
// RuleKind - Verificação Executada pela Regra
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Presença obrigatória (ausente/branco viola)
    Required,
    /// Forma do valor quando presente
    Format(FieldKind),
    /// Checksum estrutural de CPF quando presente
    Cpf,
}

// ==========================================
// ValidationRule - Regra Declarativa
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Campo alvo ao qual a regra se aplica
    pub field: String,
    pub kind: RuleKind,
    pub severity: RuleSeverity,
    /// Mensagem exibida ao operador quando a regra viola
    pub message: String,
}

impl ValidationRule {
    pub fn required(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: RuleKind::Required,
            severity: RuleSeverity::Error,
            message: message.to_string(),
        }
    }

    pub fn format(field: &str, format: FieldKind, message: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: RuleKind::Format(format),
            severity: RuleSeverity::Warning,
            message: message.to_string(),
        }
    }

    pub fn cpf(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: RuleKind::Cpf,
            severity: RuleSeverity::Warning,
            message: message.to_string(),
        }
    }
}

// ==========================================
// FieldError - Violação em um Campo de uma Linha
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub severity: RuleSeverity,
    pub message: String,
}

// ==========================================
// RowValidation - Resultado por Linha
// ==========================================
// valid = nenhuma violação de severidade Error; warnings não
// impedem a linha de seguir no pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowValidation {
    pub row_number: usize,
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl RowValidation {
    pub fn has_warnings(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == RuleSeverity::Warning)
    }

    /// Mensagens de severidade Error, para o relatório do operador
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter(|e| e.severity == RuleSeverity::Error)
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect()
    }
}

// ==========================================
// ValidationReport - Resultado do Lote
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rows: Vec<RowValidation>,
}

impl ValidationReport {
    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.valid).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.valid).count()
    }

    pub fn warning_count(&self) -> usize {
        self.rows.iter().filter(|r| r.has_warnings()).count()
    }

    /// Números (1-based) das linhas aptas a seguir para deduplicação
    pub fn valid_row_numbers(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|r| r.valid)
            .map(|r| r.row_number)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_validation_warnings() {
        let row = RowValidation {
            row_number: 1,
            valid: true,
            errors: vec![FieldError {
                field: "email".to_string(),
                severity: RuleSeverity::Warning,
                message: "email em formato inválido".to_string(),
            }],
        };
        assert!(row.has_warnings());
        assert!(row.error_messages().is_empty());
    }

    #[test]
    fn test_report_counts() {
        let report = ValidationReport {
            rows: vec![
                RowValidation {
                    row_number: 1,
                    valid: true,
                    errors: vec![],
                },
                RowValidation {
                    row_number: 2,
                    valid: false,
                    errors: vec![FieldError {
                        field: "name".to_string(),
                        severity: RuleSeverity::Error,
                        message: "campo obrigatório ausente".to_string(),
                    }],
                },
            ],
        };

        assert_eq!(report.valid_count(), 1);
        assert_eq!(report.invalid_count(), 1);
        assert_eq!(report.valid_row_numbers(), vec![1]);
    }
}
