// ==========================================
// Sistema de Gestão Escolar - Camada de API
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportSession, ImportStep};
