// ==========================================
// Sistema de Gestão Escolar - Configuração de Importação (Trait)
// ==========================================
// Responsabilidade: interface de leitura das configurações que o
// módulo de importação consome (sem escrita, sem regra de negócio)
// ==========================================

use crate::domain::types::RecordType;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implementador: ConfigManager (lê da tabela config_kv)
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// Limite de tamanho do arquivo enviado, em bytes.
    ///
    /// # Padrão
    /// - 10 MB
    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error>>;

    /// Campos de deduplicação do tipo de registro, em ordem.
    ///
    /// # Padrão
    /// - student: [cpf, registration_number]
    /// - professional: [cpf, email]
    async fn get_match_fields(
        &self,
        record_type: RecordType,
    ) -> Result<Vec<String>, Box<dyn Error>>;

    /// Identificação usada em created_by quando o contexto não
    /// informa o operador.
    ///
    /// # Padrão
    /// - "sistema"
    async fn get_default_created_by(&self) -> Result<String, Box<dyn Error>>;
}
