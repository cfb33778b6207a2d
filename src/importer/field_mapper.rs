// ==========================================
// Sistema de Gestão Escolar - Mapeador de Campos
// ==========================================
// Responsabilidade: etapa 2 do pipeline — proposta heurística de
// mapeamento origem → alvo e aplicação do conjunto de mapeamentos
// sobre as linhas brutas
// ==========================================

use crate::domain::mapping::FieldMapping;
use crate::domain::record::{CellValue, MappedRow, ParsedFile};
use crate::domain::types::{RecordType, TransformKind};
use crate::importer::record_importer_trait::FieldMapper as FieldMapperTrait;
use crate::importer::transform;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

// ==========================================
// Tabelas de Palavras-Chave
// ==========================================
// Listas ORDENADAS: a primeira palavra-chave contida no cabeçalho
// normalizado vence. Mantidas como slices constantes (não mapas)
// para comportamento reprodutível.
type KeywordRule = (&'static str, &'static str, Option<TransformKind>);

const STUDENT_KEYWORDS: &[KeywordRule] = &[
    ("matricula", "registration_number", None),
    ("nome", "name", None),
    ("aluno", "name", None),
    ("cpf", "cpf", Some(TransformKind::CpfFormat)),
    ("nascimento", "date_of_birth", Some(TransformKind::DateBrToIso)),
    ("turma", "class_name", None),
    ("serie", "grade", None),
    ("ano", "grade", None),
    ("inep", "student_id", None),
    ("bolsa", "numero_bolsa_familia", None),
    ("responsavel", "guardian_name", None),
    ("mail", "email", None),
    ("telefone", "phone", Some(TransformKind::PhoneFormat)),
    ("fone", "phone", Some(TransformKind::PhoneFormat)),
];

const PROFESSIONAL_KEYWORDS: &[KeywordRule] = &[
    ("matricula", "registration_number", None),
    ("nome", "full_name", None),
    ("cargo", "professional_role", None),
    ("funcao", "professional_role", None),
    ("cpf", "cpf", Some(TransformKind::CpfFormat)),
    ("admissao", "hire_date", Some(TransformKind::DateBrToIso)),
    ("desligamento", "termination_date", Some(TransformKind::DateBrToIso)),
    ("demissao", "termination_date", Some(TransformKind::DateBrToIso)),
    ("mail", "email", None),
    ("telefone", "phone", Some(TransformKind::PhoneFormat)),
    ("fone", "phone", Some(TransformKind::PhoneFormat)),
];

fn keyword_table(record_type: RecordType) -> &'static [KeywordRule] {
    match record_type {
        RecordType::Student => STUDENT_KEYWORDS,
        RecordType::Professional => PROFESSIONAL_KEYWORDS,
        // Tipo suportado apenas para resolução de tabela
        RecordType::User => &[],
    }
}

/// Normaliza um cabeçalho para casamento: minúsculas + remoção de
/// diacríticos ("Matrícula" → "matricula")
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

// ==========================================
// AutoMapper - Heurística de Mapeamento Inicial
// ==========================================
// Conveniência de melhor esforço, não garantia de correção: o
// operador revisa e pode sobrescrever cada entrada antes de seguir.
pub struct AutoMapper;

impl FieldMapperTrait for AutoMapper {
    /// Propõe um FieldMapping por campo de origem. Função pura dos
    /// cabeçalhos normalizados: mesma entrada → mesma proposta.
    fn propose(&self, source_fields: &[String], record_type: RecordType) -> Vec<FieldMapping> {
        let table = record_type.primary_table();
        let rules = keyword_table(record_type);
        let required: HashSet<&str> = record_type
            .default_required_fields()
            .iter()
            .copied()
            .collect();

        let mut seen = HashSet::new();
        let mut mappings = Vec::new();

        for source in source_fields {
            // Exatamente uma entrada por campo de origem
            if !seen.insert(source.clone()) {
                continue;
            }

            let normalized = normalize_header(source);
            let hit = rules.iter().find(|(keyword, _, _)| normalized.contains(keyword));

            let mapping = match hit {
                Some((_, target, transform)) => FieldMapping {
                    source_field: source.clone(),
                    target_field: (*target).to_string(),
                    target_table: table.to_string(),
                    transform: *transform,
                    required: required.contains(target),
                },
                None => FieldMapping::unmapped(source, table),
            };

            mappings.push(mapping);
        }

        mappings
    }
}

// ==========================================
// Aplicação dos Mapeamentos
// ==========================================

/// Aplica o conjunto de mapeamentos sobre o arquivo parseado,
/// produzindo as linhas mapeadas e transformadas. As transformações
/// são aplicadas aqui, uma única vez por valor.
pub fn apply_mappings(parsed: &ParsedFile, mappings: &[FieldMapping]) -> Vec<MappedRow> {
    parsed
        .rows
        .iter()
        .enumerate()
        .map(|(idx, source)| {
            let mut mapped = std::collections::HashMap::new();

            for mapping in mappings.iter().filter(|m| m.is_mapped()) {
                let raw = source
                    .get(&mapping.source_field)
                    .cloned()
                    .unwrap_or(CellValue::Null);

                let value = match mapping.transform {
                    Some(kind) => transform::apply(&raw, kind),
                    None => raw,
                };

                mapped.insert(mapping.target_field.clone(), value);
            }

            MappedRow {
                row_number: idx + 1,
                source: source.clone(),
                mapped,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{FileInfo, RawRow};
    use crate::domain::types::FileFormat;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Matrícula"), "matricula");
        assert_eq!(normalize_header("Nome do Aluno"), "nome do aluno");
        assert_eq!(normalize_header("FUNÇÃO"), "funcao");
    }

    #[test]
    fn test_student_auto_mapping() {
        let mapper = AutoMapper;
        let mappings = mapper.propose(
            &headers(&["Nome", "CPF", "Matrícula", "Data de Nascimento", "Turma"]),
            RecordType::Student,
        );

        assert_eq!(mappings[0].target_field, "name");
        assert!(mappings[0].required);
        assert_eq!(mappings[1].target_field, "cpf");
        assert_eq!(mappings[1].transform, Some(TransformKind::CpfFormat));
        assert_eq!(mappings[2].target_field, "registration_number");
        assert_eq!(mappings[3].target_field, "date_of_birth");
        assert_eq!(mappings[3].transform, Some(TransformKind::DateBrToIso));
        assert_eq!(mappings[4].target_field, "class_name");
        for m in &mappings {
            assert_eq!(m.target_table, "students");
        }
    }

    #[test]
    fn test_professional_auto_mapping() {
        let mapper = AutoMapper;
        let mappings = mapper.propose(
            &headers(&["Nome", "Cargo", "CPF", "Data de Admissão"]),
            RecordType::Professional,
        );

        assert_eq!(mappings[0].target_field, "full_name");
        assert_eq!(mappings[1].target_field, "professional_role");
        assert_eq!(mappings[2].target_field, "cpf");
        assert!(mappings[2].required);
        assert_eq!(mappings[3].target_field, "hire_date");
    }

    #[test]
    fn test_unmatched_header_stays_unmapped() {
        let mapper = AutoMapper;
        let mappings = mapper.propose(&headers(&["Observações"]), RecordType::Student);

        assert_eq!(mappings.len(), 1);
        assert!(!mappings[0].is_mapped());
    }

    #[test]
    fn test_first_keyword_wins() {
        // "ano de nascimento" contém "nascimento" e "ano"; a ordem da
        // tabela decide ("nascimento" vem antes de "ano")
        let mapper = AutoMapper;
        let mappings = mapper.propose(&headers(&["Ano de Nascimento"]), RecordType::Student);
        assert_eq!(mappings[0].target_field, "date_of_birth");
    }

    #[test]
    fn test_auto_mapping_is_deterministic() {
        let mapper = AutoMapper;
        let fields = headers(&["Nome", "CPF", "Série", "E-mail"]);
        let a = mapper.propose(&fields, RecordType::Student);
        let b = mapper.propose(&fields, RecordType::Student);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_source_fields_collapsed() {
        let mapper = AutoMapper;
        let mappings = mapper.propose(&headers(&["nome", "nome"]), RecordType::Student);
        assert_eq!(mappings.len(), 1);
    }

    #[test]
    fn test_apply_mappings_with_transform() {
        let mut row = RawRow::new();
        row.insert("nome".to_string(), CellValue::from("Ana"));
        row.insert("cpf".to_string(), CellValue::from("111.111.111-11"));

        let parsed = ParsedFile {
            headers: headers(&["nome", "cpf"]),
            rows: vec![row],
            file_info: FileInfo {
                name: "alunos.csv".to_string(),
                size_bytes: 10,
                format: FileFormat::Csv,
            },
        };

        let mapper = AutoMapper;
        let mappings = mapper.propose(&parsed.headers, RecordType::Student);
        let mapped = apply_mappings(&parsed, &mappings);

        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].row_number, 1);
        assert_eq!(
            mapped[0].mapped.get("cpf"),
            Some(&CellValue::Text("11111111111".to_string()))
        );
        assert_eq!(
            mapped[0].mapped.get("name"),
            Some(&CellValue::Text("Ana".to_string()))
        );
    }

    #[test]
    fn test_apply_mappings_missing_source_is_null() {
        let parsed = ParsedFile {
            headers: headers(&["nome", "cpf"]),
            rows: vec![{
                let mut r = RawRow::new();
                r.insert("nome".to_string(), CellValue::from("Ana"));
                r
            }],
            file_info: FileInfo {
                name: "alunos.csv".to_string(),
                size_bytes: 10,
                format: FileFormat::Csv,
            },
        };

        let mapper = AutoMapper;
        let mappings = mapper.propose(&parsed.headers, RecordType::Student);
        let mapped = apply_mappings(&parsed, &mappings);

        assert_eq!(mapped[0].mapped.get("cpf"), Some(&CellValue::Null));
    }
}
