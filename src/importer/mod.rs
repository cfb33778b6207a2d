// ==========================================
// Sistema de Gestão Escolar - Camada de Importação
// ==========================================
// Responsabilidade: pipeline de importação em lote de dados externos
// Fluxo: parse → mapeamento → validação → deduplicação → commit
// Suporta: CSV, JSON, Excel
// ==========================================

// Declaração de módulos
pub mod cpf;
pub mod duplicate_detector;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer_impl;
pub mod record_importer_trait;
pub mod transform;
pub mod validator;

// Reexporta os tipos centrais
pub use cpf::validate_cpf;
pub use duplicate_detector::MatchFieldDetector;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{apply_mappings, normalize_header, AutoMapper};
pub use file_parser::{
    detect_format, CsvParser, ExcelParser, JsonParser, UniversalFileParser,
    DEFAULT_MAX_FILE_SIZE_BYTES,
};
pub use record_importer_impl::{
    BatchCommitterImpl, CancelToken, ImportOutcome, ProgressHandle, RecordImporterImpl,
};
pub use validator::{default_rules, RecordValidator as RecordValidatorImpl};

// Reexporta as interfaces de etapa
pub use record_importer_trait::{
    BatchCommitter, CommitRequest, DuplicateDetector, FieldMapper, FileParser, RecordImporter,
    RecordValidator,
};
