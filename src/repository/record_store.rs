// ==========================================
// Sistema de Gestão Escolar - Record Store Trait
// ==========================================
// Responsabilidade: contrato de acesso ao armazenamento alvo
// (registros, lotes, auditoria e templates), sem regra de negócio
// ==========================================
// Superfície apta a lote (find_many) para permitir implementações
// paralelizadas preservando o contrato uma-linha-um-desfecho
// ==========================================

use crate::domain::batch::{ImportBatch, ImportRecord, ImportSummary};
use crate::domain::mapping::MappingTemplate;
use crate::domain::record::{CellValue, StoredRecord};
use crate::domain::types::BatchStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Filtros de busca: coluna → valor exato
pub type Filters = HashMap<String, CellValue>;

// ==========================================
// RecordStore Trait
// ==========================================
// Implementador: SqliteRecordStore
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ===== Registros alvo =====

    /// Busca um registro por igualdade em todas as colunas do filtro.
    ///
    /// # Retorno
    /// - Ok(Some): primeira correspondência (ordem estável)
    /// - Ok(None): nenhuma correspondência
    async fn find(&self, table: &str, filters: &Filters) -> RepositoryResult<Option<StoredRecord>>;

    /// Resolve várias buscas em uma única chamada, na ordem dada.
    /// O resultado i corresponde à consulta i.
    async fn find_many(
        &self,
        table: &str,
        queries: &[Filters],
    ) -> RepositoryResult<Vec<Option<StoredRecord>>>;

    /// Insere um registro; colunas desconhecidas são ignoradas.
    ///
    /// # Retorno
    /// - Ok(String): id do registro criado
    async fn insert(
        &self,
        table: &str,
        record: &HashMap<String, CellValue>,
    ) -> RepositoryResult<String>;

    /// Atualiza as colunas presentes no registro dado
    async fn update(
        &self,
        table: &str,
        id: &str,
        record: &HashMap<String, CellValue>,
    ) -> RepositoryResult<()>;

    // ===== Lotes de importação =====

    /// Cria o registro do lote (status=processing)
    async fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()>;

    /// Transição terminal do lote, com contadores finais.
    /// Chamada exatamente uma vez por lote.
    async fn finalize_batch(
        &self,
        batch_id: &str,
        status: BatchStatus,
        summary: &ImportSummary,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>>;

    // ===== Auditoria por linha =====

    /// Grava uma entrada da trilha de auditoria (append-only)
    async fn insert_import_record(&self, record: &ImportRecord) -> RepositoryResult<()>;

    /// Entradas de auditoria de um lote, em ordem de linha
    async fn list_import_records(&self, batch_id: &str) -> RepositoryResult<Vec<ImportRecord>>;

    // ===== Templates de mapeamento =====

    /// Grava (ou substitui pelo nome) um template de mapeamento
    async fn save_template(&self, template: &MappingTemplate) -> RepositoryResult<()>;

    async fn load_template(&self, name: &str) -> RepositoryResult<Option<MappingTemplate>>;

    async fn list_templates(&self) -> RepositoryResult<Vec<MappingTemplate>>;
}
