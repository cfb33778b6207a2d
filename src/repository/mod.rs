// ==========================================
// Sistema de Gestão Escolar - Camada de Repositório
// ==========================================
// Acesso a dados, sem regra de negócio
// ==========================================

pub mod error;
pub mod record_store;
pub mod record_store_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use record_store::{Filters, RecordStore};
pub use record_store_impl::SqliteRecordStore;
