// ==========================================
// Sistema de Gestão Escolar - Gerenciador de Configuração
// ==========================================
// Lê pares chave/valor da tabela config_kv, com padrões de código
// quando a chave não existe
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::RecordType;
use crate::importer::file_parser::DEFAULT_MAX_FILE_SIZE_BYTES;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Valor bruto de uma chave (None quando ausente)
    pub fn get_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Grava (ou substitui) uma chave
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error>> {
        Ok(self
            .get_value("import.max_file_size_bytes")?
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES))
    }

    async fn get_match_fields(
        &self,
        record_type: RecordType,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        let key = format!("import.match_fields.{}", record_type);
        let configured = self.get_value(&key)?.map(|v| {
            v.split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect::<Vec<_>>()
        });

        match configured {
            Some(fields) if !fields.is_empty() => Ok(fields),
            _ => Ok(record_type
                .default_match_fields()
                .iter()
                .map(|f| f.to_string())
                .collect()),
        }
    }

    async fn get_default_created_by(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_value("import.default_created_by")?
            .unwrap_or_else(|| "sistema".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(file.path().to_str().unwrap()).unwrap();
        (file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let (_file, config) = manager();

        assert_eq!(
            config.get_max_file_size_bytes().await.unwrap(),
            DEFAULT_MAX_FILE_SIZE_BYTES
        );
        assert_eq!(
            config.get_match_fields(RecordType::Student).await.unwrap(),
            vec!["cpf", "registration_number"]
        );
        assert_eq!(config.get_default_created_by().await.unwrap(), "sistema");
    }

    #[tokio::test]
    async fn test_configured_values_override_defaults() {
        let (_file, config) = manager();

        config
            .set_value("import.max_file_size_bytes", "1024")
            .unwrap();
        config
            .set_value("import.match_fields.student", "cpf, student_id")
            .unwrap();

        assert_eq!(config.get_max_file_size_bytes().await.unwrap(), 1024);
        assert_eq!(
            config.get_match_fields(RecordType::Student).await.unwrap(),
            vec!["cpf", "student_id"]
        );
    }

    #[tokio::test]
    async fn test_invalid_size_falls_back() {
        let (_file, config) = manager();
        config
            .set_value("import.max_file_size_bytes", "nada")
            .unwrap();

        assert_eq!(
            config.get_max_file_size_bytes().await.unwrap(),
            DEFAULT_MAX_FILE_SIZE_BYTES
        );
    }
}
