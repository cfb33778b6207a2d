// ==========================================
// Sistema de Gestão Escolar - Biblioteca Central
// ==========================================
// Pipeline de importação em lote: parse → mapeamento → validação →
// deduplicação → commit, com checkpoints do operador entre etapas
// Stack: Rust + SQLite
// ==========================================

// ==========================================
// Declaração de módulos
// ==========================================

// Camada de domínio - entidades e tipos
pub mod domain;

// Camada de repositório - acesso a dados
pub mod repository;

// Camada de importação - pipeline
pub mod importer;

// Camada de configuração
pub mod config;

// Infraestrutura de banco (PRAGMAs unificados)
pub mod db;

// Sistema de logs
pub mod logging;

// Camada de API - interface de negócio
pub mod api;

// ==========================================
// Reexporta os tipos centrais
// ==========================================

// Tipos de domínio
pub use domain::types::{
    BatchStatus, DuplicateAction, FieldKind, FileFormat, RecordType, RowAction, RowStatus,
    RuleSeverity, TransformKind,
};

// Entidades de domínio
pub use domain::{
    CellValue, DuplicateCandidate, FieldMapping, ImportBatch, ImportRecord, ImportSummary,
    MappedRow, MappingTemplate, ParsedFile, ResolutionSheet, StoredRecord, TenantContext,
    ValidationReport, ValidationRule,
};

// Pipeline
pub use importer::{
    validate_cpf, AutoMapper, BatchCommitterImpl, CancelToken, ImportError, ImportOutcome,
    MatchFieldDetector, ProgressHandle, RecordImporter, RecordImporterImpl, UniversalFileParser,
};

// Repositório
pub use repository::{RecordStore, SqliteRecordStore};

// Configuração
pub use config::{ConfigManager, ImportConfigReader};

// API
pub use api::{ImportSession, ImportStep};

// ==========================================
// Constantes do sistema
// ==========================================

// Versão do sistema
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Nome do sistema
pub const APP_NAME: &str = "Sistema de Gestão Escolar - Importação";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
