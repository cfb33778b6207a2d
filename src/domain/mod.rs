// ==========================================
// Sistema de Gestão Escolar - Camada de Domínio
// ==========================================

pub mod batch;
pub mod duplicate;
pub mod mapping;
pub mod record;
pub mod types;
pub mod validation;

pub use batch::{
    error_log_content, error_log_filename, ImportBatch, ImportRecord, ImportSummary, TenantContext,
};
pub use duplicate::{DuplicateCandidate, ResolutionSheet};
pub use mapping::{has_mapped_field, FieldMapping, MappingTemplate, TemplateEntry};
pub use record::{CellValue, FileInfo, MappedRow, ParsedFile, RawRow, StoredRecord};
pub use types::{
    BatchStatus, DuplicateAction, FieldKind, FileFormat, RecordType, RowAction, RowStatus,
    RuleSeverity, TransformKind,
};
pub use validation::{FieldError, RowValidation, RuleKind, ValidationReport, ValidationRule};
