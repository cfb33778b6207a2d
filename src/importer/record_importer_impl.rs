// ==========================================
// Sistema de Gestão Escolar - Importador de Registros
// ==========================================
// Responsabilidade: etapa de commit (lote + auditoria + contadores)
// e a composição do pipeline completo
// Fluxo: parse → mapeamento → validação → deduplicação → commit
// ==========================================
// Uma linha, um desfecho: success | failed | skipped | duplicate.
// Falha em uma linha não aborta o lote.
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::batch::{ImportBatch, ImportRecord, ImportSummary, TenantContext};
use crate::domain::duplicate::{DuplicateCandidate, ResolutionSheet};
use crate::domain::mapping::has_mapped_field;
use crate::domain::record::{CellValue, MappedRow};
use crate::domain::types::{
    BatchStatus, DuplicateAction, RecordType, RowAction, RowStatus, RuleSeverity,
};
use crate::domain::validation::RowValidation;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::apply_mappings;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_importer_trait::{
    BatchCommitter, CommitRequest, DuplicateDetector, FieldMapper, RecordImporter, RecordValidator,
};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ProgressHandle - Indicador de Progresso
// ==========================================
// current_row cresce monotonicamente durante o commit; observável
// de outra thread/task pelo clone do handle
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    current_row: Arc<AtomicUsize>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_row(&self) -> usize {
        self.current_row.load(Ordering::SeqCst)
    }

    fn advance_to(&self, row: usize) {
        self.current_row.fetch_max(row, Ordering::SeqCst);
    }
}

// ==========================================
// CancelToken - Cancelamento de Commit
// ==========================================
// Disparado, interrompe a emissão de novas operações de linha; o
// lote termina como failed com contadores parciais
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ==========================================
// ImportOutcome - Resultado do Commit
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch: ImportBatch,
    pub records: Vec<ImportRecord>,
    pub summary: ImportSummary,
}

// ==========================================
// BatchCommitterImpl - Etapa de Commit
// ==========================================
pub struct BatchCommitterImpl;

#[async_trait]
impl BatchCommitter for BatchCommitterImpl {
    #[instrument(skip(self, store, request), fields(batch_id))]
    async fn commit(
        &self,
        store: &dyn RecordStore,
        request: CommitRequest<'_>,
    ) -> ImportResult<ImportOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let mut batch = ImportBatch {
            id: batch_id.clone(),
            file_name: request.file_info.name.clone(),
            file_size_bytes: request.file_info.size_bytes,
            file_format: request.file_info.format,
            total_records: request.rows.len(),
            created_by: request.created_by.to_string(),
            tenant_id: request.tenant.tenant_id.clone(),
            school_id: request.tenant.school_id.clone(),
            status: BatchStatus::Processing,
            created_at: Utc::now(),
            completed_at: None,
            success_count: 0,
            failure_count: 0,
            duplicate_count: 0,
            skipped_count: 0,
            warnings_count: 0,
        };

        // Armazenamento inalcançável aqui = lote nem começa
        store
            .insert_batch(&batch)
            .await
            .map_err(|e| ImportError::StoreError(e.to_string()))?;

        info!(
            batch_id = %batch_id,
            arquivo = %batch.file_name,
            total = batch.total_records,
            "commit do lote iniciado"
        );

        let table = request.record_type.primary_table();
        let validation_by_row: HashMap<usize, &RowValidation> = request
            .validation
            .rows
            .iter()
            .map(|r| (r.row_number, r))
            .collect();
        let candidate_by_row: HashMap<usize, &DuplicateCandidate> = request
            .candidates
            .iter()
            .map(|c| (c.source_row, c))
            .collect();

        let mut summary = ImportSummary {
            total: request.rows.len(),
            ..ImportSummary::default()
        };
        let mut records: Vec<ImportRecord> = Vec::with_capacity(request.rows.len());
        let mut cancelled = false;

        for row in request.rows {
            if request.cancel.is_some_and(CancelToken::is_cancelled) {
                warn!(batch_id = %batch_id, linha = row.row_number, "commit cancelado pelo operador");
                cancelled = true;
                break;
            }

            if let Some(progress) = request.progress {
                progress.advance_to(row.row_number);
            }

            let validation = validation_by_row.get(&row.row_number);
            let warning = validation.and_then(|v| warning_text(v));

            let (action, status, target_record_id, error_message) = match validation {
                Some(v) if !v.valid => {
                    // Linha reprovada na validação: registrada como
                    // failed, sem operação no armazenamento
                    let message = v.error_messages().join("; ");
                    (RowAction::None, RowStatus::Failed, None, Some(message))
                }
                _ => match candidate_by_row.get(&row.row_number) {
                    Some(candidate) => {
                        let decision = request
                            .decisions
                            .decision_for(row.row_number)
                            .unwrap_or(DuplicateAction::Skip);
                        apply_duplicate_decision(store, table, request.tenant, candidate, row, decision)
                            .await
                    }
                    None => insert_row(store, table, request.tenant, row).await,
                },
            };

            match status {
                RowStatus::Success => summary.success += 1,
                RowStatus::Failed => summary.failure += 1,
                RowStatus::Skipped => summary.skipped += 1,
                RowStatus::Duplicate => summary.duplicate += 1,
            }
            if warning.is_some() {
                summary.warnings += 1;
            }

            let record = ImportRecord {
                id: Uuid::new_v4().to_string(),
                batch_id: batch_id.clone(),
                row_number: row.row_number,
                source_data: serde_json::to_string(&row.source).unwrap_or_else(|_| "{}".to_string()),
                mapped_data: serde_json::to_string(&row.mapped).unwrap_or_else(|_| "{}".to_string()),
                action,
                status,
                target_record_id,
                warning,
                error_message,
                created_at: Utc::now(),
            };

            // Auditoria é melhor esforço: falha na gravação não muda
            // o desfecho da linha
            if let Err(e) = store.insert_import_record(&record).await {
                warn!(batch_id = %batch_id, linha = row.row_number, erro = %e, "falha ao gravar auditoria da linha");
            }

            debug!(
                batch_id = %batch_id,
                linha = row.row_number,
                status = %record.status,
                "linha processada"
            );

            records.push(record);
        }

        let final_status = if cancelled {
            BatchStatus::Failed
        } else {
            BatchStatus::Completed
        };
        let completed_at = Utc::now();

        store
            .finalize_batch(&batch_id, final_status, &summary, completed_at)
            .await
            .map_err(|e| ImportError::StoreError(e.to_string()))?;

        batch.status = final_status;
        batch.completed_at = Some(completed_at);
        batch.success_count = summary.success;
        batch.failure_count = summary.failure;
        batch.duplicate_count = summary.duplicate;
        batch.skipped_count = summary.skipped;
        batch.warnings_count = summary.warnings;

        info!(
            batch_id = %batch_id,
            status = %final_status,
            sucesso = summary.success,
            falha = summary.failure,
            duplicatas = summary.duplicate,
            ignoradas = summary.skipped,
            avisos = summary.warnings,
            "commit do lote encerrado"
        );

        Ok(ImportOutcome {
            batch,
            records,
            summary,
        })
    }
}

/// Texto de warning da linha (mensagens de severidade Warning)
fn warning_text(validation: &RowValidation) -> Option<String> {
    let warnings: Vec<String> = validation
        .errors
        .iter()
        .filter(|e| e.severity == RuleSeverity::Warning)
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect();

    if warnings.is_empty() {
        None
    } else {
        Some(warnings.join("; "))
    }
}

/// Dados da linha prontos para escrita, com o contexto de tenant
fn record_payload(tenant: &TenantContext, row: &MappedRow) -> HashMap<String, CellValue> {
    let mut payload = row.mapped.clone();
    payload.insert("tenant_id".to_string(), CellValue::from(tenant.tenant_id.clone()));
    payload.insert("school_id".to_string(), CellValue::from(tenant.school_id.clone()));
    payload
}

/// Política de merge: valor de entrada não vazio prevalece; campo
/// vazio/ausente na entrada fica fora do UPDATE e preserva o valor
/// existente
fn merge_payload(tenant: &TenantContext, row: &MappedRow) -> HashMap<String, CellValue> {
    let mut payload = HashMap::new();
    for (field, value) in &row.mapped {
        if !value.is_blank() {
            payload.insert(field.clone(), value.clone());
        }
    }
    payload.insert("tenant_id".to_string(), CellValue::from(tenant.tenant_id.clone()));
    payload.insert("school_id".to_string(), CellValue::from(tenant.school_id.clone()));
    payload
}

type RowOutcome = (RowAction, RowStatus, Option<String>, Option<String>);

/// Inserção limpa de uma linha
async fn insert_row(
    store: &dyn RecordStore,
    table: &str,
    tenant: &TenantContext,
    row: &MappedRow,
) -> RowOutcome {
    match store.insert(table, &record_payload(tenant, row)).await {
        Ok(id) => (RowAction::Insert, RowStatus::Success, Some(id), None),
        Err(e) => {
            error!(linha = row.row_number, erro = %e, "armazenamento rejeitou a inserção");
            (
                RowAction::Insert,
                RowStatus::Failed,
                None,
                Some(format!("registro rejeitado pelo armazenamento: {}", e)),
            )
        }
    }
}

/// Aplica a decisão registrada para uma duplicata
async fn apply_duplicate_decision(
    store: &dyn RecordStore,
    table: &str,
    tenant: &TenantContext,
    candidate: &DuplicateCandidate,
    row: &MappedRow,
    decision: DuplicateAction,
) -> RowOutcome {
    match decision {
        DuplicateAction::Skip => (
            RowAction::Skip,
            RowStatus::Skipped,
            Some(candidate.existing.id.clone()),
            None,
        ),
        DuplicateAction::Overwrite => {
            match store
                .update(table, &candidate.existing.id, &record_payload(tenant, row))
                .await
            {
                Ok(()) => (
                    RowAction::Overwrite,
                    RowStatus::Duplicate,
                    Some(candidate.existing.id.clone()),
                    None,
                ),
                Err(e) => (
                    RowAction::Overwrite,
                    RowStatus::Failed,
                    None,
                    Some(format!("falha ao sobrescrever registro: {}", e)),
                ),
            }
        }
        DuplicateAction::Merge => {
            let payload = merge_payload(tenant, row);
            match store.update(table, &candidate.existing.id, &payload).await {
                Ok(()) => (
                    RowAction::Merge,
                    RowStatus::Duplicate,
                    Some(candidate.existing.id.clone()),
                    None,
                ),
                Err(e) => (
                    RowAction::Merge,
                    RowStatus::Failed,
                    None,
                    Some(format!("falha ao mesclar registro: {}", e)),
                ),
            }
        }
        DuplicateAction::CreateNew => match store.insert(table, &record_payload(tenant, row)).await
        {
            Ok(id) => (RowAction::CreateNew, RowStatus::Success, Some(id), None),
            Err(e) => (
                RowAction::CreateNew,
                RowStatus::Failed,
                None,
                Some(format!("registro rejeitado pelo armazenamento: {}", e)),
            ),
        },
    }
}

// ==========================================
// RecordImporterImpl - Pipeline Completo
// ==========================================
pub struct RecordImporterImpl<S, C>
where
    S: RecordStore,
    C: ImportConfigReader,
{
    store: S,
    config: C,

    // Componentes de etapa
    field_mapper: Box<dyn FieldMapper>,
    validator: Box<dyn RecordValidator>,
    duplicate_detector: Box<dyn DuplicateDetector>,
    committer: Box<dyn BatchCommitter>,
}

impl<S, C> RecordImporterImpl<S, C>
where
    S: RecordStore,
    C: ImportConfigReader,
{
    pub fn new(
        store: S,
        config: C,
        field_mapper: Box<dyn FieldMapper>,
        validator: Box<dyn RecordValidator>,
        duplicate_detector: Box<dyn DuplicateDetector>,
        committer: Box<dyn BatchCommitter>,
    ) -> Self {
        Self {
            store,
            config,
            field_mapper,
            validator,
            duplicate_detector,
            committer,
        }
    }
}

#[async_trait]
impl<S, C> RecordImporter for RecordImporterImpl<S, C>
where
    S: RecordStore,
    C: ImportConfigReader,
{
    #[instrument(skip(self, path, tenant), fields(record_type = %record_type))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        path: P,
        record_type: RecordType,
        tenant: &TenantContext,
    ) -> ImportResult<ImportOutcome> {
        // === Etapa 1: parse ===
        let max_size = self
            .config
            .get_max_file_size_bytes()
            .await
            .map_err(|e| ImportError::InternalError(e.to_string()))?;
        let parsed = UniversalFileParser::new(max_size).parse(path.as_ref())?;
        info!(
            arquivo = %parsed.file_info.name,
            formato = %parsed.file_info.format,
            linhas = parsed.total_rows(),
            "arquivo parseado"
        );

        // === Etapa 2: mapeamento automático ===
        let mappings = self.field_mapper.propose(&parsed.headers, record_type);
        if !has_mapped_field(&mappings) {
            return Err(ImportError::NoMappedFields);
        }
        let rows = apply_mappings(&parsed, &mappings);
        debug!(
            mapeados = mappings.iter().filter(|m| m.is_mapped()).count(),
            "mapeamento aplicado"
        );

        // === Etapa 3: validação ===
        let validation = self.validator.validate(&rows, &mappings);
        info!(
            validas = validation.valid_count(),
            invalidas = validation.invalid_count(),
            avisos = validation.warning_count(),
            "validação concluída"
        );

        // === Etapa 4: deduplicação (somente linhas válidas) ===
        let match_fields = self
            .config
            .get_match_fields(record_type)
            .await
            .map_err(|e| ImportError::InternalError(e.to_string()))?;
        let valid_numbers: std::collections::HashSet<usize> =
            validation.valid_row_numbers().into_iter().collect();
        let valid_rows: Vec<MappedRow> = rows
            .iter()
            .filter(|r| valid_numbers.contains(&r.row_number))
            .cloned()
            .collect();

        let candidates = self
            .duplicate_detector
            .detect(
                &self.store,
                record_type.primary_table(),
                &match_fields,
                &valid_rows,
            )
            .await?;

        // === Etapa 5: commit (não assistido: pendentes → skip) ===
        let mut decisions = ResolutionSheet::new();
        decisions.finalize(&candidates);

        let created_by = if tenant.user_id.is_empty() {
            self.config
                .get_default_created_by()
                .await
                .map_err(|e| ImportError::InternalError(e.to_string()))?
        } else {
            tenant.user_id.clone()
        };

        self.committer
            .commit(
                &self.store,
                CommitRequest {
                    record_type,
                    file_info: &parsed.file_info,
                    rows: &rows,
                    validation: &validation,
                    candidates: &candidates,
                    decisions: &decisions,
                    tenant,
                    created_by: &created_by,
                    progress: None,
                    cancel: None,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_handle_monotonic() {
        let progress = ProgressHandle::new();
        progress.advance_to(3);
        progress.advance_to(1);
        assert_eq!(progress.current_row(), 3);
        progress.advance_to(7);
        assert_eq!(progress.current_row(), 7);
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_merge_payload_keeps_existing_on_blank_incoming() {
        let tenant = TenantContext {
            tenant_id: "t1".to_string(),
            school_id: "e1".to_string(),
            user_id: "u1".to_string(),
        };
        let row = MappedRow {
            row_number: 1,
            source: HashMap::new(),
            mapped: [
                ("name".to_string(), CellValue::from("Ana")),
                ("class_name".to_string(), CellValue::from("")),
            ]
            .into_iter()
            .collect(),
        };

        let payload = merge_payload(&tenant, &row);

        // Campo vazio de entrada fica fora do payload: o valor
        // existente não é tocado pelo UPDATE
        assert!(payload.contains_key("name"));
        assert!(!payload.contains_key("class_name"));
        assert!(payload.contains_key("tenant_id"));
    }
}
