// ==========================================
// Sistema de Gestão Escolar - Sessão de Importação
// ==========================================
// Responsabilidade: orquestrar o fluxo em etapas com checkpoints do
// operador: upload → mapeamento → validação → duplicatas → commit
// ==========================================
// As transições validam a etapa atual; falha de parse devolve a
// sessão ao upload sem ParsedFile parcial.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::batch::{error_log_content, error_log_filename, TenantContext};
use crate::domain::duplicate::{DuplicateCandidate, ResolutionSheet};
use crate::domain::mapping::{has_mapped_field, FieldMapping, MappingTemplate};
use crate::domain::record::{MappedRow, ParsedFile};
use crate::domain::types::{DuplicateAction, RecordType, TransformKind};
use crate::domain::validation::{ValidationReport, ValidationRule};
use crate::importer::error::ImportError;
use crate::importer::field_mapper::{apply_mappings, AutoMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_importer_impl::{
    BatchCommitterImpl, CancelToken, ImportOutcome, ProgressHandle,
};
use crate::importer::record_importer_trait::{
    BatchCommitter, CommitRequest, DuplicateDetector, FieldMapper,
    RecordValidator as RecordValidatorTrait,
};
use crate::importer::validator::RecordValidator;
use crate::importer::MatchFieldDetector;
use crate::repository::record_store::RecordStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// ImportStep - Etapa Atual da Sessão
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Upload,
    Mapping,
    Validation,
    Duplicates,
    Done,
}

impl ImportStep {
    fn name(&self) -> &'static str {
        match self {
            ImportStep::Upload => "upload",
            ImportStep::Mapping => "mapeamento",
            ImportStep::Validation => "validação",
            ImportStep::Duplicates => "duplicatas",
            ImportStep::Done => "concluída",
        }
    }
}

// ==========================================
// ImportSession
// ==========================================
pub struct ImportSession<S, C>
where
    S: RecordStore,
    C: ImportConfigReader,
{
    store: S,
    config: C,
    record_type: RecordType,
    tenant: Option<TenantContext>,
    step: ImportStep,

    parsed: Option<ParsedFile>,
    mappings: Vec<FieldMapping>,
    validator: RecordValidator,
    mapped_rows: Vec<MappedRow>,
    validation: Option<ValidationReport>,
    candidates: Vec<DuplicateCandidate>,
    decisions: ResolutionSheet,
    progress: ProgressHandle,
}

impl<S, C> ImportSession<S, C>
where
    S: RecordStore,
    C: ImportConfigReader,
{
    /// Nova sessão para o tipo de registro escolhido pelo operador
    pub fn new(store: S, config: C, record_type: RecordType) -> Self {
        Self {
            store,
            config,
            record_type,
            tenant: None,
            step: ImportStep::Upload,
            parsed: None,
            mappings: Vec::new(),
            validator: RecordValidator::with_default_rules(record_type),
            mapped_rows: Vec::new(),
            validation: None,
            candidates: Vec::new(),
            decisions: ResolutionSheet::new(),
            progress: ProgressHandle::new(),
        }
    }

    pub fn set_tenant(&mut self, tenant: TenantContext) {
        self.tenant = Some(tenant);
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn require_step(&self, expected: ImportStep) -> ApiResult<()> {
        if self.step != expected {
            return Err(ApiError::WrongStep {
                expected: expected.name(),
                actual: self.step.name(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Etapa 1: upload e parse
    // ==========================================

    /// Faz o parse do arquivo enviado e entra na etapa de mapeamento
    /// com a proposta automática. Um novo upload substitui o
    /// ParsedFile anterior e reinicia as etapas seguintes; falha de
    /// parse deixa a sessão como estava (o operador tenta de novo com
    /// outro arquivo).
    #[instrument(skip(self, path))]
    pub async fn upload<P: AsRef<Path>>(&mut self, path: P) -> ApiResult<&ParsedFile> {
        let max_size = self
            .config
            .get_max_file_size_bytes()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let parsed = UniversalFileParser::new(max_size).parse(path.as_ref())?;

        info!(
            arquivo = %parsed.file_info.name,
            formato = %parsed.file_info.format,
            linhas = parsed.total_rows(),
            "upload parseado"
        );

        self.mappings = AutoMapper.propose(&parsed.headers, self.record_type);
        self.parsed = Some(parsed);
        self.mapped_rows.clear();
        self.validation = None;
        self.candidates.clear();
        self.decisions = ResolutionSheet::new();
        self.step = ImportStep::Mapping;

        Ok(self.parsed.as_ref().unwrap())
    }

    // ==========================================
    // Etapa 2: mapeamento
    // ==========================================

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Altera o alvo (e opcionalmente a transformação) de um campo de
    /// origem. Alvo vazio desfaz o mapeamento; trocar o alvo devolve a
    /// tabela à canônica do tipo de registro.
    pub fn set_mapping(
        &mut self,
        source_field: &str,
        target_field: &str,
        transform: Option<TransformKind>,
    ) -> ApiResult<()> {
        if self.step == ImportStep::Upload {
            return Err(ApiError::WrongStep {
                expected: ImportStep::Mapping.name(),
                actual: self.step.name(),
            });
        }

        if !target_field.is_empty()
            && !self.record_type.target_fields().contains(&target_field)
        {
            return Err(ApiError::ImportFailed(ImportError::InvalidTargetField {
                record_type: self.record_type.to_string(),
                field: target_field.to_string(),
            }));
        }

        let table = self.record_type.primary_table().to_string();
        let required: HashSet<&str> = self
            .record_type
            .default_required_fields()
            .iter()
            .copied()
            .collect();

        let mapping = self
            .mappings
            .iter_mut()
            .find(|m| m.source_field == source_field)
            .ok_or_else(|| {
                ApiError::ImportFailed(ImportError::UnknownSourceField(source_field.to_string()))
            })?;

        mapping.target_field = target_field.to_string();
        mapping.target_table = table;
        mapping.transform = transform;
        mapping.required = required.contains(target_field);

        // Mudança de mapeamento invalida validação e duplicatas já
        // computadas
        self.invalidate_downstream();
        Ok(())
    }

    fn invalidate_downstream(&mut self) {
        self.mapped_rows.clear();
        self.validation = None;
        self.candidates.clear();
        self.decisions = ResolutionSheet::new();
        if self.step != ImportStep::Upload {
            self.step = ImportStep::Mapping;
        }
    }

    /// Grava o conjunto atual como template nomeado reutilizável
    pub async fn save_template(
        &self,
        name: &str,
        source_system: Option<&str>,
    ) -> ApiResult<MappingTemplate> {
        if self.tenant.is_none() {
            // Erro transitório: não afeta o estado de mapeamento
            return Err(ApiError::MissingTenantContext);
        }
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "nome do template não pode ser vazio".to_string(),
            ));
        }

        let template = MappingTemplate::from_mappings(
            Uuid::new_v4().to_string(),
            name,
            source_system.map(|s| s.to_string()),
            self.parsed.as_ref().map(|p| p.file_info.format),
            &self.mappings,
        );

        self.store.save_template(&template).await?;
        info!(template = name, "template de mapeamento salvo");
        Ok(template)
    }

    /// Carrega um template salvo, sobrescrevendo o conjunto atual
    /// (campos de origem fora do template ficam não mapeados)
    pub async fn load_template(&mut self, name: &str) -> ApiResult<()> {
        let template = self
            .store
            .load_template(name)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("template {}", name)))?;

        template.apply(&mut self.mappings, self.record_type.primary_table());
        self.invalidate_downstream();
        info!(template = name, "template de mapeamento aplicado");
        Ok(())
    }

    // ==========================================
    // Etapa 3: validação
    // ==========================================

    /// Avança para a validação. Porta: ao menos um campo mapeado.
    pub fn advance_to_validation(&mut self) -> ApiResult<&ValidationReport> {
        self.require_step(ImportStep::Mapping)?;

        if !has_mapped_field(&self.mappings) {
            return Err(ApiError::ImportFailed(ImportError::NoMappedFields));
        }

        let parsed = self.parsed.as_ref().expect("upload antes do mapeamento");
        self.mapped_rows = apply_mappings(parsed, &self.mappings);
        self.validation = Some(self.validator.validate(&self.mapped_rows, &self.mappings));
        self.step = ImportStep::Validation;

        Ok(self.validation.as_ref().unwrap())
    }

    pub fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }

    /// Liga/desliga as validações padrão. Desligado, nada bloqueia a
    /// importação.
    pub fn set_use_default_rules(&mut self, enabled: bool) {
        self.validator = if enabled {
            RecordValidator::with_default_rules(self.record_type)
        } else {
            RecordValidator::without_rules()
        };
        self.revalidate();
    }

    /// Regra ad-hoc do operador (campo + severidade + mensagem)
    pub fn add_rule(&mut self, rule: ValidationRule) {
        self.validator.add_rule(rule);
        self.revalidate();
    }

    pub fn remove_rules_for_field(&mut self, field: &str) {
        self.validator.remove_rules_for_field(field);
        self.revalidate();
    }

    /// Revalida quando a configuração de regras muda com um relatório
    /// já computado
    fn revalidate(&mut self) {
        if self.validation.is_some() {
            self.validation = Some(self.validator.validate(&self.mapped_rows, &self.mappings));
            // Duplicatas dependem do conjunto de linhas válidas
            self.candidates.clear();
            self.decisions = ResolutionSheet::new();
            if self.step == ImportStep::Duplicates {
                self.step = ImportStep::Validation;
            }
        }
    }

    // ==========================================
    // Etapa 4: duplicatas
    // ==========================================

    /// Detecta duplicatas das linhas válidas e entra na etapa de
    /// resolução
    #[instrument(skip(self))]
    pub async fn advance_to_duplicates(&mut self) -> ApiResult<&[DuplicateCandidate]> {
        self.require_step(ImportStep::Validation)?;

        let validation = self.validation.as_ref().expect("validação computada");
        let valid_numbers: HashSet<usize> = validation.valid_row_numbers().into_iter().collect();
        let valid_rows: Vec<MappedRow> = self
            .mapped_rows
            .iter()
            .filter(|r| valid_numbers.contains(&r.row_number))
            .cloned()
            .collect();

        let match_fields = self
            .config
            .get_match_fields(self.record_type)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        self.candidates = MatchFieldDetector
            .detect(
                &self.store,
                self.record_type.primary_table(),
                &match_fields,
                &valid_rows,
            )
            .await?;
        self.decisions = ResolutionSheet::new();
        self.step = ImportStep::Duplicates;

        Ok(&self.candidates)
    }

    pub fn candidates(&self) -> &[DuplicateCandidate] {
        &self.candidates
    }

    pub fn pending_count(&self) -> usize {
        self.decisions.pending_count(&self.candidates)
    }

    /// Decisão explícita para uma duplicata
    pub fn resolve(&mut self, source_row: usize, action: DuplicateAction) -> ApiResult<()> {
        self.require_step(ImportStep::Duplicates)?;

        if !self.candidates.iter().any(|c| c.source_row == source_row) {
            return Err(ApiError::NotFound(format!(
                "duplicata na linha {}",
                source_row
            )));
        }

        self.decisions.resolve(source_row, action);
        Ok(())
    }

    /// Ação global: estampa a decisão em todas as pendentes
    pub fn resolve_all(&mut self, action: DuplicateAction) -> ApiResult<()> {
        self.require_step(ImportStep::Duplicates)?;
        self.decisions.resolve_all_pending(&self.candidates, action);
        Ok(())
    }

    /// Fecha a resolução: pendentes recebem skip (fail-safe)
    pub fn finalize_resolutions(&mut self) -> ApiResult<()> {
        self.require_step(ImportStep::Duplicates)?;
        self.decisions.finalize(&self.candidates);
        Ok(())
    }

    // ==========================================
    // Etapa 5: commit
    // ==========================================

    /// Handle de progresso observável durante o commit
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Executa o commit do lote. Portas: etapa de duplicatas
    /// encerrada com zero pendências e contexto de tenant presente.
    #[instrument(skip(self, cancel))]
    pub async fn commit(&mut self, cancel: Option<&CancelToken>) -> ApiResult<ImportOutcome> {
        self.require_step(ImportStep::Duplicates)?;

        let pending = self.pending_count();
        if pending > 0 {
            return Err(ApiError::ImportFailed(ImportError::PendingDuplicates(
                pending,
            )));
        }

        let tenant = self
            .tenant
            .clone()
            .ok_or(ApiError::MissingTenantContext)?;

        let parsed = self.parsed.as_ref().expect("upload antes do commit");
        let validation = self.validation.as_ref().expect("validação antes do commit");

        let outcome = BatchCommitterImpl
            .commit(
                &self.store,
                CommitRequest {
                    record_type: self.record_type,
                    file_info: &parsed.file_info,
                    rows: &self.mapped_rows,
                    validation,
                    candidates: &self.candidates,
                    decisions: &self.decisions,
                    tenant: &tenant,
                    created_by: &tenant.user_id,
                    progress: Some(&self.progress),
                    cancel,
                },
            )
            .await?;

        self.step = ImportStep::Done;
        Ok(outcome)
    }

    // ==========================================
    // Pós-commit: log de erros
    // ==========================================

    /// Grava o log de erros de um lote já commitado no diretório
    /// dado; devolve o caminho do arquivo
    /// (`erros-importacao-<batchId>.txt`)
    pub async fn write_error_log(&self, batch_id: &str, dir: &Path) -> ApiResult<PathBuf> {
        let records = self.store.list_import_records(batch_id).await?;
        let content = error_log_content(&records);

        let path = dir.join(error_log_filename(batch_id));
        std::fs::write(&path, content)
            .map_err(|e| ApiError::DatabaseError(format!("falha ao gravar log: {}", e)))?;
        Ok(path)
    }
}
