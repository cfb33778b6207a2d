// ==========================================
// Sistema de Gestão Escolar - Validador de Registros
// ==========================================
// Responsabilidade: etapa 3 do pipeline — aplica o conjunto de regras
// do tipo de registro sobre as linhas mapeadas, separando válidas de
// inválidas com mensagens por campo
// ==========================================
// Somente regras de campos efetivamente mapeados ficam ativas.
// Error bloqueia a linha; Warning é retido para revisão.
// ==========================================

use crate::domain::mapping::FieldMapping;
use crate::domain::record::{CellValue, MappedRow};
use crate::domain::types::{FieldKind, RecordType, RuleSeverity, TransformKind};
use crate::domain::validation::{
    FieldError, RowValidation, RuleKind, ValidationReport, ValidationRule,
};
use crate::importer::cpf::validate_cpf;
use crate::importer::record_importer_trait::RecordValidator as RecordValidatorTrait;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Regras padrão do tipo de registro
pub fn default_rules(record_type: RecordType) -> Vec<ValidationRule> {
    match record_type {
        RecordType::Student => vec![
            ValidationRule::required("name", "campo obrigatório ausente"),
            ValidationRule::cpf("cpf", "CPF estruturalmente inválido"),
            ValidationRule::format("email", FieldKind::Email, "email em formato inválido"),
            ValidationRule::format("date_of_birth", FieldKind::Date, "data em formato inválido"),
        ],
        RecordType::Professional => vec![
            ValidationRule::required("full_name", "campo obrigatório ausente"),
            ValidationRule::required("cpf", "campo obrigatório ausente"),
            ValidationRule::cpf("cpf", "CPF estruturalmente inválido"),
            ValidationRule::format("email", FieldKind::Email, "email em formato inválido"),
            ValidationRule::format("hire_date", FieldKind::Date, "data em formato inválido"),
        ],
        RecordType::User => vec![
            ValidationRule::required("name", "campo obrigatório ausente"),
            ValidationRule::required("email", "campo obrigatório ausente"),
        ],
    }
}

// ==========================================
// RecordValidator
// ==========================================
pub struct RecordValidator {
    rules: Vec<ValidationRule>,
    /// Deriva verificações dos próprios mapeamentos (flag required e
    /// transformação de data); desligado junto com as validações padrão
    mapping_checks: bool,
}

impl RecordValidator {
    /// Validador com as regras padrão do tipo de registro
    pub fn with_default_rules(record_type: RecordType) -> Self {
        Self {
            rules: default_rules(record_type),
            mapping_checks: true,
        }
    }

    /// Validador sem regra alguma ("usar validações padrão" desligado:
    /// nada bloqueia a importação, nem o flag required dos mapeamentos)
    pub fn without_rules() -> Self {
        Self {
            rules: Vec::new(),
            mapping_checks: false,
        }
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Regra ad-hoc do operador
    pub fn add_rule(&mut self, rule: ValidationRule) {
        self.rules.push(rule);
    }

    /// Remove todas as regras de um campo
    pub fn remove_rules_for_field(&mut self, field: &str) {
        self.rules.retain(|r| r.field != field);
    }

    /// Limpa o conjunto de regras inteiro
    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Subconjunto ativo: apenas regras de campos atualmente mapeados
    fn active_rules(&self, mapped_targets: &HashSet<&str>) -> Vec<&ValidationRule> {
        self.rules
            .iter()
            .filter(|r| mapped_targets.contains(r.field.as_str()))
            .collect()
    }
}

impl RecordValidatorTrait for RecordValidator {
    /// Avalia todas as regras ativas sobre cada linha mapeada.
    ///
    /// Além das regras configuradas, derivam-se dos mapeamentos:
    /// - `required` marcado no mapeamento → presença obrigatória;
    /// - transformação `date_br_to_iso` → warning quando o valor
    ///   repassado não ficou em forma de data (entradas malformadas
    ///   não somem em silêncio).
    fn validate(&self, rows: &[MappedRow], mappings: &[FieldMapping]) -> ValidationReport {
        let mapped_targets: HashSet<&str> = mappings
            .iter()
            .filter(|m| m.is_mapped())
            .map(|m| m.target_field.as_str())
            .collect();

        let active = self.active_rules(&mapped_targets);

        // Campos obrigatórios vindos do conjunto de mapeamentos, sem
        // duplicar regras Required já configuradas
        let rule_required: HashSet<&str> = active
            .iter()
            .filter(|r| r.kind == RuleKind::Required)
            .map(|r| r.field.as_str())
            .collect();
        let mapping_required: Vec<&str> = if self.mapping_checks {
            mappings
                .iter()
                .filter(|m| m.is_mapped() && m.required)
                .map(|m| m.target_field.as_str())
                .filter(|f| !rule_required.contains(f))
                .collect()
        } else {
            Vec::new()
        };

        // Campos com date_br_to_iso sem regra de data explícita
        let rule_dated: HashSet<&str> = active
            .iter()
            .filter(|r| r.kind == RuleKind::Format(FieldKind::Date))
            .map(|r| r.field.as_str())
            .collect();
        let transform_dated: Vec<&str> = if self.mapping_checks {
            mappings
                .iter()
                .filter(|m| m.is_mapped() && m.transform == Some(TransformKind::DateBrToIso))
                .map(|m| m.target_field.as_str())
                .filter(|f| !rule_dated.contains(f))
                .collect()
        } else {
            Vec::new()
        };

        let row_results = rows
            .iter()
            .map(|row| {
                let mut errors: Vec<FieldError> = Vec::new();

                for field in &mapping_required {
                    if is_blank(row, field) {
                        errors.push(FieldError {
                            field: (*field).to_string(),
                            severity: RuleSeverity::Error,
                            message: "campo obrigatório ausente".to_string(),
                        });
                    }
                }

                for rule in &active {
                    if let Some(error) = evaluate_rule(rule, row) {
                        errors.push(error);
                    }
                }

                for field in &transform_dated {
                    if let Some(value) = row.mapped.get(*field) {
                        if !value.is_blank() && !is_date_shaped(&value.as_text()) {
                            errors.push(FieldError {
                                field: (*field).to_string(),
                                severity: RuleSeverity::Warning,
                                message: "data em formato inválido".to_string(),
                            });
                        }
                    }
                }

                let valid = !errors.iter().any(|e| e.severity == RuleSeverity::Error);
                RowValidation {
                    row_number: row.row_number,
                    valid,
                    errors,
                }
            })
            .collect();

        ValidationReport { rows: row_results }
    }
}

fn is_blank(row: &MappedRow, field: &str) -> bool {
    row.mapped.get(field).map_or(true, CellValue::is_blank)
}

/// Avalia uma regra sobre uma linha; None = sem violação
fn evaluate_rule(rule: &ValidationRule, row: &MappedRow) -> Option<FieldError> {
    let value = row.mapped.get(&rule.field);

    let violated = match rule.kind {
        RuleKind::Required => value.map_or(true, CellValue::is_blank),
        // Verificações de forma só se aplicam a valores presentes
        RuleKind::Format(kind) => match value {
            Some(v) if !v.is_blank() => !matches_kind(v, kind),
            _ => false,
        },
        RuleKind::Cpf => match value {
            Some(v) if !v.is_blank() => !validate_cpf(&v.as_text()),
            _ => false,
        },
    };

    violated.then(|| FieldError {
        field: rule.field.clone(),
        severity: rule.severity,
        message: rule.message.clone(),
    })
}

fn matches_kind(value: &CellValue, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Text => true,
        FieldKind::Number => match value {
            CellValue::Number(_) => true,
            CellValue::Text(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        },
        FieldKind::Boolean => match value {
            CellValue::Bool(_) => true,
            CellValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "false" | "0" | "1" | "sim" | "nao" | "não" | "yes" | "no"
            ),
            _ => false,
        },
        FieldKind::Date => is_date_shaped(&value.as_text()),
        FieldKind::Email => is_email_shaped(&value.as_text()),
    }
}

/// Aceita AAAA-MM-DD ou DD/MM/AAAA
fn is_date_shaped(value: &str) -> bool {
    let v = value.trim();
    NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(v, "%d/%m/%Y").is_ok()
}

/// Forma mínima de email: local@domínio com ponto no domínio
fn is_email_shaped(value: &str) -> bool {
    let v = value.trim();
    if v.contains(char::is_whitespace) {
        return false;
    }
    match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::MappedRow;
    use std::collections::HashMap;

    fn row(fields: &[(&str, CellValue)]) -> MappedRow {
        MappedRow {
            row_number: 1,
            source: HashMap::new(),
            mapped: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn mapping(source: &str, target: &str) -> FieldMapping {
        FieldMapping {
            source_field: source.to_string(),
            target_field: target.to_string(),
            target_table: "students".to_string(),
            transform: None,
            required: false,
        }
    }

    #[test]
    fn test_required_field_missing_blocks_row() {
        let validator = RecordValidator::with_default_rules(RecordType::Student);
        let mappings = vec![mapping("nome", "name")];
        let rows = vec![row(&[("name", CellValue::Null)])];

        let report = validator.validate(&rows, &mappings);

        assert!(!report.rows[0].valid);
        assert_eq!(report.rows[0].errors[0].severity, RuleSeverity::Error);
    }

    #[test]
    fn test_unmapped_rule_is_inactive() {
        // Regra de name existe, mas name não está mapeado: nada viola
        let validator = RecordValidator::with_default_rules(RecordType::Student);
        let mappings = vec![mapping("cpf", "cpf")];
        let rows = vec![row(&[("cpf", CellValue::from("52998224725"))])];

        let report = validator.validate(&rows, &mappings);

        assert!(report.rows[0].valid);
        assert!(report.rows[0].errors.is_empty());
    }

    #[test]
    fn test_invalid_cpf_is_warning_only() {
        let validator = RecordValidator::with_default_rules(RecordType::Student);
        let mappings = vec![mapping("nome", "name"), mapping("cpf", "cpf")];
        let rows = vec![row(&[
            ("name", CellValue::from("Ana")),
            ("cpf", CellValue::from("11111111111")),
        ])];

        let report = validator.validate(&rows, &mappings);

        // Warning não bloqueia, mas fica retido
        assert!(report.rows[0].valid);
        assert!(report.rows[0].has_warnings());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email_shaped("ana@escola.gov.br"));
        assert!(!is_email_shaped("ana@escola"));
        assert!(!is_email_shaped("ana escola@x.com"));
        assert!(!is_email_shaped("semarroba"));
        assert!(!is_email_shaped("@dominio.com"));
    }

    #[test]
    fn test_no_rules_nothing_blocks() {
        let validator = RecordValidator::without_rules();
        let mappings = vec![mapping("nome", "name")];
        let rows = vec![row(&[("name", CellValue::Null)])];

        let report = validator.validate(&rows, &mappings);

        assert!(report.rows[0].valid);
    }

    #[test]
    fn test_custom_rule_added_and_removed() {
        let mut validator = RecordValidator::without_rules();
        validator.add_rule(ValidationRule {
            field: "grade".to_string(),
            kind: RuleKind::Format(FieldKind::Number),
            severity: RuleSeverity::Error,
            message: "série deve ser numérica".to_string(),
        });

        let mappings = vec![mapping("serie", "grade")];
        let rows = vec![row(&[("grade", CellValue::from("quinta"))])];

        let report = validator.validate(&rows, &mappings);
        assert!(!report.rows[0].valid);

        validator.remove_rules_for_field("grade");
        let report = validator.validate(&rows, &mappings);
        assert!(report.rows[0].valid);
    }

    #[test]
    fn test_mapping_required_flag_blocks() {
        // Nenhuma regra padrão cobre registration_number: só o flag
        // required do mapeamento bloqueia
        let validator = RecordValidator::with_default_rules(RecordType::Student);
        let mut m = mapping("matricula", "registration_number");
        m.required = true;

        let rows = vec![row(&[("registration_number", CellValue::from(""))])];
        let report = validator.validate(&rows, &[m]);

        assert!(!report.rows[0].valid);
    }

    #[test]
    fn test_mapping_required_flag_inert_without_rules() {
        // Validações desligadas: nem o flag required dos mapeamentos
        // bloqueia
        let validator = RecordValidator::without_rules();
        let mut m = mapping("matricula", "registration_number");
        m.required = true;

        let rows = vec![row(&[("registration_number", CellValue::from(""))])];
        let report = validator.validate(&rows, &[m]);

        assert!(report.rows[0].valid);
    }

    #[test]
    fn test_date_transform_passthrough_surfaces_warning() {
        // Valor que a transformação date_br_to_iso deixou passar
        // inalterado gera warning de qualidade de dado
        // (termination_date não tem regra de data padrão)
        let validator = RecordValidator::with_default_rules(RecordType::Professional);
        let mut m = mapping("desligamento", "termination_date");
        m.transform = Some(TransformKind::DateBrToIso);

        let rows = vec![row(&[("termination_date", CellValue::from("31-02-x"))])];
        let report = validator.validate(&rows, &[m]);

        assert!(report.rows[0].valid);
        assert!(report.rows[0].has_warnings());
    }

    #[test]
    fn test_date_kinds_accept_both_shapes() {
        assert!(is_date_shaped("2020-03-05"));
        assert!(is_date_shaped("05/03/2020"));
        assert!(!is_date_shaped("05-03-2020"));
    }
}
