// ==========================================
// Sistema de Gestão Escolar - Erros da Camada de Repositório
// ==========================================
// Repositório não contém regra de negócio; os erros aqui são
// estritamente de acesso a dados
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity} (id={id}) não encontrado")]
    NotFound { entity: String, id: String },

    #[error("tabela desconhecida: {0}")]
    UnknownTable(String),

    #[error("coluna desconhecida na tabela {table}: {column}")]
    UnknownColumn { table: String, column: String },

    #[error("falha de conexão com o banco: {0}")]
    DatabaseConnectionError(String),

    #[error("falha em transação do banco: {0}")]
    DatabaseTransactionError(String),

    #[error("falha em consulta ao banco: {0}")]
    DatabaseQueryError(String),

    #[error("violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("falha ao obter lock do banco: {0}")]
    LockError(String),

    #[error("falha de serialização: {0}")]
    SerializationError(String),

    #[error("erro interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("UNIQUE") => {
                RepositoryError::UniqueConstraintViolation(msg.clone())
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

/// Alias de Result da camada
pub type RepositoryResult<T> = Result<T, RepositoryError>;
