// ==========================================
// Sistema de Gestão Escolar - Camada de Configuração
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

pub use config_manager::ConfigManager;
pub use import_config_trait::ImportConfigReader;
