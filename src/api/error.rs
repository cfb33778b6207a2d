// ==========================================
// Sistema de Gestão Escolar - Erros da Camada de API
// ==========================================
// Converte erros das camadas internas em mensagens acionáveis para
// o operador
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Fluxo de etapas =====
    #[error("operação fora de etapa: esperada {expected}, atual {actual}")]
    WrongStep {
        expected: &'static str,
        actual: &'static str,
    },

    // ===== Entrada do operador =====
    #[error("entrada inválida: {0}")]
    InvalidInput(String),

    #[error("recurso não encontrado: {0}")]
    NotFound(String),

    // ===== Contexto =====
    #[error("contexto de tenant ausente")]
    MissingTenantContext,

    // ===== Pipeline =====
    #[error("falha na importação: {0}")]
    ImportFailed(#[from] ImportError),

    // ===== Acesso a dados =====
    #[error("erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Alias de Result da camada
pub type ApiResult<T> = Result<T, ApiError>;
