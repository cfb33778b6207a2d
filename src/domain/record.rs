// ==========================================
// Sistema de Gestão Escolar - Registros Tabulares
// ==========================================
// Forma uniforme produzida pelos parsers: cabeçalhos ordenados +
// linhas como mapas campo → valor escalar
// ==========================================

use crate::domain::types::FileFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// CellValue - Valor Escalar de Célula
// ==========================================
// União etiquetada dos tipos escalares que um arquivo pode conter.
// A forma das linhas é dirigida pelo mapeamento, nunca conhecida
// estaticamente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Valor vazio: Null, texto em branco, ou texto vazio
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Representação textual do valor (Null → string vazia)
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // Inteiros sem casa decimal artificial
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Linha bruta: mapa nome-de-coluna → valor escalar
pub type RawRow = HashMap<String, CellValue>;

// ==========================================
// FileInfo - Metadados do Arquivo
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub format: FileFormat,
}

// ==========================================
// ParsedFile - Saída Uniforme dos Parsers
// ==========================================
// Invariantes: rows.len() == total_rows; as chaves de cada linha
// são subconjunto de headers. Imutável após criação; um novo upload
// substitui a instância inteira.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub file_info: FileInfo,
}

impl ParsedFile {
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }
}

// ==========================================
// MappedRow - Linha Mapeada e Transformada
// ==========================================
// Produto da aplicação do conjunto de mapeamentos sobre uma linha
// bruta; alimenta validação, deduplicação e commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedRow {
    /// Número da linha no arquivo original (1-based)
    pub row_number: usize,
    /// Dados originais, chaveados pelo cabeçalho de origem
    pub source: RawRow,
    /// Dados mapeados e transformados, chaveados pelo campo alvo
    pub mapped: HashMap<String, CellValue>,
}

// ==========================================
// StoredRecord - Registro Existente no Armazenamento
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub fields: HashMap<String, CellValue>,
}
