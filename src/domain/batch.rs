// ==========================================
// Sistema de Gestão Escolar - Lote de Importação
// ==========================================
// Trilha de auditoria: um ImportBatch por execução de commit e um
// ImportRecord por linha de origem (append-only)
// ==========================================

use crate::domain::types::{BatchStatus, FileFormat, RowAction, RowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// TenantContext - Contexto Multi-Tenant
// ==========================================
// Obrigatório no commit e na gravação de templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: String,
    pub school_id: String,
    pub user_id: String,
}

// ==========================================
// ImportBatch - Registro do Lote
// ==========================================
// Criado uma vez no início do commit (status=processing); atualizado
// exatamente uma vez na transição terminal com os contadores finais
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub id: String,
    pub file_name: String,
    pub file_size_bytes: u64,
    pub file_format: FileFormat,
    pub total_records: usize,
    pub created_by: String,
    pub tenant_id: String,
    pub school_id: String,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    // ===== Contadores finais =====
    pub success_count: usize,
    pub failure_count: usize,
    pub duplicate_count: usize,
    pub skipped_count: usize,
    pub warnings_count: usize,
}

// ==========================================
// ImportRecord - Auditoria por Linha
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: String,
    pub batch_id: String,
    /// Número da linha no arquivo original (1-based)
    pub row_number: usize,
    /// Dados originais da linha (JSON)
    pub source_data: String,
    /// Dados mapeados/transformados (JSON)
    pub mapped_data: String,
    pub action: RowAction,
    pub status: RowStatus,
    /// Id do registro alvo criado/atualizado, quando houver
    pub target_record_id: Option<String>,
    /// Texto de warning retido para revisão do operador
    pub warning: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// ImportSummary - Contadores Agregados
// ==========================================
// Invariante: success + failure + duplicate + skipped == total
// (warnings são aditivos, não exclusivos)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    pub duplicate: usize,
    pub skipped: usize,
    pub warnings: usize,
}

impl ImportSummary {
    /// Verifica a conservação dos contadores
    pub fn is_conserved(&self) -> bool {
        self.success + self.failure + self.duplicate + self.skipped == self.total
    }
}

// ==========================================
// Exportação do Log de Erros
// ==========================================

/// Nome do arquivo de log de erros de um lote
pub fn error_log_filename(batch_id: &str) -> String {
    format!("erros-importacao-{}.txt", batch_id)
}

/// Conteúdo do log: uma linha por mensagem de erro, no formato
/// `Linha <n>: <mensagem>`
pub fn error_log_content(records: &[ImportRecord]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for record in records {
        if let Some(message) = &record.error_message {
            lines.push(format!("Linha {}: {}", record.row_number, message));
        }
    }
    lines.join("\n")
}
