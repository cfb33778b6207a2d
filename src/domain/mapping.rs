// ==========================================
// Sistema de Gestão Escolar - Mapeamento de Campos
// ==========================================
// Responsabilidade: campo de origem → campo/tabela alvo + transformação
// Inicializado pela heurística automática; editável pelo operador;
// persistível como template nomeado reutilizável
// ==========================================

use crate::domain::types::{FileFormat, TransformKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// FieldMapping - Entrada de Mapeamento
// ==========================================
// Invariante: exatamente uma entrada por campo de origem; o conjunto
// de source_field coincide com os cabeçalhos do arquivo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Um dos cabeçalhos do ParsedFile (único no conjunto)
    pub source_field: String,
    /// Vazio = não mapeado; senão um campo do esquema alvo enumerado
    pub target_field: String,
    /// Tabela lógica de destino (derivada do campo alvo)
    pub target_table: String,
    /// Transformação opcional do conjunto fixo
    pub transform: Option<TransformKind>,
    /// Ausência/branco bloqueia a importação da linha
    pub required: bool,
}

impl FieldMapping {
    /// Entrada não mapeada para um campo de origem
    pub fn unmapped(source_field: &str, table: &str) -> Self {
        Self {
            source_field: source_field.to_string(),
            target_field: String::new(),
            target_table: table.to_string(),
            transform: None,
            required: false,
        }
    }

    pub fn is_mapped(&self) -> bool {
        !self.target_field.is_empty()
    }
}

/// Pelo menos um campo mapeado libera o avanço da etapa de mapeamento
pub fn has_mapped_field(mappings: &[FieldMapping]) -> bool {
    mappings.iter().any(FieldMapping::is_mapped)
}

// ==========================================
// TemplateEntry - Tupla Persistida por Campo de Origem
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub target: String,
    pub table: String,
    pub transform: Option<TransformKind>,
    pub required: bool,
}

// ==========================================
// MappingTemplate - Template Nomeado Reutilizável
// ==========================================
// Persistido em import_configs; chaveado pelo nome; aplicável a
// importações futuras do mesmo sistema de origem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingTemplate {
    pub id: String,
    pub name: String,
    pub source_system: Option<String>,
    pub file_format: Option<FileFormat>,
    /// campo de origem → tupla {target, table, transform, required}
    pub field_mappings: HashMap<String, TemplateEntry>,
}

impl MappingTemplate {
    /// Captura o conjunto de mapeamentos atual como template
    pub fn from_mappings(
        id: String,
        name: &str,
        source_system: Option<String>,
        file_format: Option<FileFormat>,
        mappings: &[FieldMapping],
    ) -> Self {
        let field_mappings = mappings
            .iter()
            .map(|m| {
                (
                    m.source_field.clone(),
                    TemplateEntry {
                        target: m.target_field.clone(),
                        table: m.target_table.clone(),
                        transform: m.transform,
                        required: m.required,
                    },
                )
            })
            .collect();

        Self {
            id,
            name: name.to_string(),
            source_system,
            file_format,
            field_mappings,
        }
    }

    /// Aplica o template sobre o conjunto atual: campos cobertos
    /// recebem a tupla armazenada; campos fora do template ficam
    /// não mapeados
    pub fn apply(&self, mappings: &mut [FieldMapping], default_table: &str) {
        for mapping in mappings.iter_mut() {
            match self.field_mappings.get(&mapping.source_field) {
                Some(entry) => {
                    mapping.target_field = entry.target.clone();
                    mapping.target_table = entry.table.clone();
                    mapping.transform = entry.transform;
                    mapping.required = entry.required;
                }
                None => {
                    mapping.target_field = String::new();
                    mapping.target_table = default_table.to_string();
                    mapping.transform = None;
                    mapping.required = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_has_mapped_field() {
        let none = vec![
            FieldMapping::unmapped("a", "students"),
            FieldMapping::unmapped("b", "students"),
        ];
        assert!(!has_mapped_field(&none));

        let one = vec![FieldMapping::unmapped("a", "students"), mapping("b", "name")];
        assert!(has_mapped_field(&one));
    }

    #[test]
    fn test_template_roundtrip() {
        let mappings = vec![mapping("nome", "name"), mapping("cpf", "cpf")];
        let template = MappingTemplate::from_mappings(
            "t1".to_string(),
            "secretaria-2026",
            Some("SED".to_string()),
            None,
            &mappings,
        );

        // Conjunto novo com um campo a mais, fora do template
        let mut fresh = vec![
            mapping("nome", "guardian_name"),
            mapping("cpf", "registration_number"),
            mapping("extra", "email"),
        ];
        template.apply(&mut fresh, "students");

        assert_eq!(fresh[0].target_field, "name");
        assert_eq!(fresh[1].target_field, "cpf");
        // Campo não coberto volta a não mapeado
        assert_eq!(fresh[2].target_field, "");
        assert_eq!(fresh[2].target_table, "students");
    }
}
