// ==========================================
// Sistema de Gestão Escolar - Erros do Módulo de Importação
// ==========================================
// Ferramenta: macro derive do thiserror
// ==========================================

use thiserror::Error;

/// Erros do módulo de importação
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Erros de arquivo =====
    #[error("arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("formato de arquivo não suportado: {0} (aceitos: .csv/.json/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("arquivo excede o limite de {limit_bytes} bytes (tamanho: {size_bytes})")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("falha na leitura do arquivo: {0}")]
    FileReadError(String),

    // ===== Erros de parse =====
    #[error("falha no parse do CSV: {0}")]
    CsvParseError(String),

    #[error("falha no parse do JSON: {0}")]
    JsonParseError(String),

    #[error("formato JSON inválido: esperado array de objetos ou objeto com propriedade 'data'")]
    InvalidJsonShape,

    #[error("falha no parse da planilha: {0}")]
    SpreadsheetParseError(String),

    // ===== Erros de mapeamento =====
    #[error("campo de origem desconhecido: {0}")]
    UnknownSourceField(String),

    #[error("campo alvo inválido para {record_type}: {field}")]
    InvalidTargetField { record_type: String, field: String },

    #[error("nenhum campo mapeado: mapeie ao menos um campo antes de prosseguir")]
    NoMappedFields,

    // ===== Erros de resolução de duplicatas =====
    #[error("existem {0} duplicatas pendentes de decisão")]
    PendingDuplicates(usize),

    // ===== Erros de armazenamento =====
    #[error("falha no armazenamento: {0}")]
    StoreError(String),

    // ===== Genéricos =====
    #[error("erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::SpreadsheetParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

/// Alias de Result do módulo
pub type ImportResult<T> = Result<T, ImportError>;
