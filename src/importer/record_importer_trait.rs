// ==========================================
// Sistema de Gestão Escolar - Traits do Pipeline de Importação
// ==========================================
// Responsabilidade: definir as interfaces de cada etapa (sem
// implementação)
// ==========================================
// Fluxo: parse → mapeamento → validação → deduplicação → commit,
// com checkpoints do operador entre as etapas
// ==========================================

use crate::domain::batch::TenantContext;
use crate::domain::duplicate::{DuplicateCandidate, ResolutionSheet};
use crate::domain::mapping::FieldMapping;
use crate::domain::record::{FileInfo, MappedRow, ParsedFile};
use crate::domain::types::RecordType;
use crate::domain::validation::ValidationReport;
use crate::importer::error::ImportResult;
use crate::importer::record_importer_impl::{CancelToken, ImportOutcome, ProgressHandle};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// Etapa 1: arquivo → forma tabular uniforme
// Implementadores: CsvParser, JsonParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// Faz o parse do arquivo para a forma tabular uniforme.
    ///
    /// # Parâmetros
    /// - path: caminho do arquivo enviado
    /// - max_size: limite de tamanho em bytes
    ///
    /// # Retorno
    /// - Ok(ParsedFile): cabeçalhos + linhas
    /// - Err: falha de leitura ou de parse (fatal para a tentativa;
    ///   nenhum ParsedFile parcial é produzido)
    fn parse(&self, path: &Path, max_size: u64) -> ImportResult<ParsedFile>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// Etapa 2: proposta heurística de mapeamento inicial
// Implementador: AutoMapper
pub trait FieldMapper: Send + Sync {
    /// Propõe um FieldMapping por campo de origem.
    ///
    /// Determinístico: função pura dos cabeçalhos normalizados e do
    /// tipo de registro. Campos sem correspondência ficam não
    /// mapeados — o operador revisa tudo antes de prosseguir.
    fn propose(&self, source_fields: &[String], record_type: RecordType) -> Vec<FieldMapping>;
}

// ==========================================
// RecordValidator Trait
// ==========================================
// Etapa 3: regras declarativas sobre as linhas mapeadas
// Implementador: RecordValidator (validator.rs)
pub trait RecordValidator: Send + Sync {
    /// Avalia as regras ativas (campos mapeados) sobre cada linha.
    ///
    /// # Retorno
    /// - ValidationReport: resultado por linha; linhas sem violação
    ///   de severidade Error seguem para a deduplicação
    fn validate(&self, rows: &[MappedRow], mappings: &[FieldMapping]) -> ValidationReport;
}

// ==========================================
// DuplicateDetector Trait
// ==========================================
// Etapa 4: consulta ao armazenamento alvo por campos de casamento
// Implementador: MatchFieldDetector
#[async_trait]
pub trait DuplicateDetector: Send + Sync {
    /// Detecta duplicatas das linhas válidas contra o armazenamento.
    ///
    /// # Parâmetros
    /// - store: armazenamento alvo
    /// - table: tabela primária do tipo de registro
    /// - match_fields: campos de casamento, em ordem
    /// - rows: linhas mapeadas que passaram na validação
    ///
    /// # Retorno
    /// - Ok(Vec<DuplicateCandidate>): uma candidata por linha com
    ///   correspondência; ausência de correspondência = inserção limpa
    async fn detect(
        &self,
        store: &dyn RecordStore,
        table: &str,
        match_fields: &[String],
        rows: &[MappedRow],
    ) -> ImportResult<Vec<DuplicateCandidate>>;
}

// ==========================================
// BatchCommitter Trait
// ==========================================
// Etapa 5: repete as decisões linha a linha contra o armazenamento
// Implementador: RecordImporterImpl
#[async_trait]
pub trait BatchCommitter: Send + Sync {
    /// Executa o commit do lote.
    ///
    /// Cria o ImportBatch (status=processing), processa cada linha em
    /// ordem gravando um ImportRecord por linha, e faz a transição
    /// terminal com os contadores finais. Falha em uma linha não
    /// aborta o lote.
    async fn commit(
        &self,
        store: &dyn RecordStore,
        request: CommitRequest<'_>,
    ) -> ImportResult<ImportOutcome>;
}

// ==========================================
// RecordImporter Trait
// ==========================================
// Importação não assistida de ponta a ponta (CLI e automações):
// auto-mapeamento, validações padrão, duplicatas resolvidas como skip
// Implementador: RecordImporterImpl
#[async_trait]
pub trait RecordImporter: Send + Sync {
    /// Executa o pipeline inteiro sobre um arquivo.
    ///
    /// # Parâmetros
    /// - path: caminho do arquivo (.csv/.json/.xlsx/.xls)
    /// - record_type: tipo de registro alvo
    /// - tenant: contexto multi-tenant do commit
    ///
    /// # Retorno
    /// - Ok(ImportOutcome): lote, trilha de auditoria e contadores
    /// - Err: falha de parse, mapeamento vazio ou armazenamento
    ///   inalcançável
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        path: P,
        record_type: RecordType,
        tenant: &TenantContext,
    ) -> ImportResult<ImportOutcome>;
}

// ==========================================
// CommitRequest - Entrada da Etapa de Commit
// ==========================================
pub struct CommitRequest<'a> {
    pub record_type: RecordType,
    pub file_info: &'a FileInfo,
    /// Todas as linhas mapeadas, em ordem de arquivo
    pub rows: &'a [MappedRow],
    pub validation: &'a ValidationReport,
    pub candidates: &'a [DuplicateCandidate],
    /// Planilha de decisões já finalizada (pendentes → skip)
    pub decisions: &'a ResolutionSheet,
    pub tenant: &'a TenantContext,
    pub created_by: &'a str,
    /// Indicador de progresso visível ao operador
    pub progress: Option<&'a ProgressHandle>,
    /// Token de cancelamento (para o lote como failed com contadores
    /// parciais)
    pub cancel: Option<&'a CancelToken>,
}
