// ==========================================
// Sistema de Gestão Escolar - Record Store (SQLite)
// ==========================================
// Implementação rusqlite do RecordStore. Cria o schema na primeira
// abertura; colunas fora da lista conhecida da tabela são ignoradas
// na escrita.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::batch::{ImportBatch, ImportRecord, ImportSummary};
use crate::domain::mapping::MappingTemplate;
use crate::domain::record::{CellValue, StoredRecord};
use crate::domain::types::{BatchStatus, FileFormat, RowAction, RowStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{Filters, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ===== Colunas conhecidas por tabela alvo =====
const STUDENT_COLUMNS: &[&str] = &[
    "tenant_id",
    "school_id",
    "name",
    "cpf",
    "date_of_birth",
    "registration_number",
    "class_name",
    "grade",
    "student_id",
    "numero_bolsa_familia",
    "guardian_name",
    "email",
    "phone",
];

const PROFESSIONAL_COLUMNS: &[&str] = &[
    "tenant_id",
    "school_id",
    "full_name",
    "cpf",
    "registration_number",
    "professional_role",
    "hire_date",
    "termination_date",
    "email",
    "phone",
];

const USER_COLUMNS: &[&str] = &["tenant_id", "school_id", "name", "email", "cpf"];

fn table_columns(table: &str) -> Option<&'static [&'static str]> {
    match table {
        "students" => Some(STUDENT_COLUMNS),
        "professionals" => Some(PROFESSIONAL_COLUMNS),
        "users" => Some(USER_COLUMNS),
        _ => None,
    }
}

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Abre (ou cria) o banco e garante o schema
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn init_schema(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                tenant_id TEXT,
                school_id TEXT,
                name TEXT,
                cpf TEXT,
                date_of_birth TEXT,
                registration_number TEXT,
                class_name TEXT,
                grade TEXT,
                student_id TEXT,
                numero_bolsa_familia TEXT,
                guardian_name TEXT,
                email TEXT,
                phone TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS professionals (
                id TEXT PRIMARY KEY,
                tenant_id TEXT,
                school_id TEXT,
                full_name TEXT,
                cpf TEXT,
                registration_number TEXT,
                professional_role TEXT,
                hire_date TEXT,
                termination_date TEXT,
                email TEXT,
                phone TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                tenant_id TEXT,
                school_id TEXT,
                name TEXT,
                email TEXT,
                cpf TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS import_batches (
                id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                file_size_bytes INTEGER NOT NULL,
                file_format TEXT NOT NULL,
                total_records INTEGER NOT NULL,
                created_by TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                school_id TEXT NOT NULL,
                status TEXT NOT NULL,
                success_count INTEGER NOT NULL DEFAULT 0,
                failure_count INTEGER NOT NULL DEFAULT 0,
                duplicate_count INTEGER NOT NULL DEFAULT 0,
                skipped_count INTEGER NOT NULL DEFAULT 0,
                warnings_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS import_records (
                id TEXT PRIMARY KEY,
                batch_id TEXT NOT NULL REFERENCES import_batches(id),
                row_number INTEGER NOT NULL,
                source_data TEXT NOT NULL,
                mapped_data TEXT NOT NULL,
                action TEXT NOT NULL,
                status TEXT NOT NULL,
                target_record_id TEXT,
                warning TEXT,
                error_message TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_import_records_batch
                ON import_records(batch_id, row_number);

            CREATE TABLE IF NOT EXISTS import_configs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                source_system TEXT,
                file_format TEXT,
                field_mappings TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Valida tabela e colunas de um filtro/registro contra a lista
    /// conhecida; devolve apenas pares em colunas conhecidas
    fn known_pairs<'a>(
        table: &str,
        fields: &'a HashMap<String, CellValue>,
    ) -> RepositoryResult<Vec<(&'a str, &'a CellValue)>> {
        let columns =
            table_columns(table).ok_or_else(|| RepositoryError::UnknownTable(table.to_string()))?;

        Ok(fields
            .iter()
            .filter(|(k, _)| columns.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
            .collect())
    }

    fn filter_pairs<'a>(
        table: &str,
        filters: &'a Filters,
    ) -> RepositoryResult<Vec<(&'a str, &'a CellValue)>> {
        let columns =
            table_columns(table).ok_or_else(|| RepositoryError::UnknownTable(table.to_string()))?;

        // Filtro em coluna desconhecida é erro do chamador, não
        // descarte silencioso
        for key in filters.keys() {
            if !columns.contains(&key.as_str()) {
                return Err(RepositoryError::UnknownColumn {
                    table: table.to_string(),
                    column: key.clone(),
                });
            }
        }

        Ok(filters.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }

    fn find_with_conn(
        conn: &Connection,
        table: &str,
        filters: &Filters,
    ) -> RepositoryResult<Option<StoredRecord>> {
        let pairs = Self::filter_pairs(table, filters)?;
        if pairs.is_empty() {
            return Ok(None);
        }

        let where_clause = pairs
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{} = ?{}", col, i + 1))
            .collect::<Vec<_>>()
            .join(" AND ");

        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY rowid LIMIT 1",
            table, where_clause
        );

        let values: Vec<Value> = pairs.iter().map(|(_, v)| cell_to_sql(v)).collect();

        let mut stmt = conn.prepare(&sql)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let record = stmt
            .query_row(params_from_iter(values.iter()), |row| {
                let mut fields = HashMap::new();
                let mut id = String::new();
                for (idx, name) in column_names.iter().enumerate() {
                    let value = sql_to_cell(row.get_ref(idx)?);
                    if name == "id" {
                        id = value.as_text();
                    } else {
                        fields.insert(name.clone(), value);
                    }
                }
                Ok(StoredRecord { id, fields })
            })
            .optional()?;

        Ok(record)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find(&self, table: &str, filters: &Filters) -> RepositoryResult<Option<StoredRecord>> {
        let conn = self.lock()?;
        Self::find_with_conn(&conn, table, filters)
    }

    async fn find_many(
        &self,
        table: &str,
        queries: &[Filters],
    ) -> RepositoryResult<Vec<Option<StoredRecord>>> {
        let conn = self.lock()?;
        // Resolução sequencial: preserva a ordem determinística das
        // consultas (resultado i ↔ consulta i)
        queries
            .iter()
            .map(|filters| Self::find_with_conn(&conn, table, filters))
            .collect()
    }

    async fn insert(
        &self,
        table: &str,
        record: &HashMap<String, CellValue>,
    ) -> RepositoryResult<String> {
        let pairs = Self::known_pairs(table, record)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut columns: Vec<&str> = vec!["id"];
        let mut values: Vec<Value> = vec![Value::Text(id.clone())];
        for (col, cell) in &pairs {
            columns.push(col);
            values.push(cell_to_sql(cell));
        }
        columns.push("created_at");
        values.push(Value::Text(now.clone()));
        columns.push("updated_at");
        values.push(Value::Text(now));

        let placeholders = (1..=values.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        let conn = self.lock()?;
        conn.execute(&sql, params_from_iter(values.iter()))?;
        Ok(id)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        record: &HashMap<String, CellValue>,
    ) -> RepositoryResult<()> {
        let pairs = Self::known_pairs(table, record)?;
        if pairs.is_empty() {
            return Ok(());
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        for (i, (col, cell)) in pairs.iter().enumerate() {
            assignments.push(format!("{} = ?{}", col, i + 1));
            values.push(cell_to_sql(cell));
        }
        let updated_idx = values.len() + 1;
        assignments.push(format!("updated_at = ?{}", updated_idx));
        values.push(Value::Text(Utc::now().to_rfc3339()));
        values.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            assignments.join(", "),
            updated_idx + 1
        );

        let conn = self.lock()?;
        let affected = conn.execute(&sql, params_from_iter(values.iter()))?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_batches (
                id, file_name, file_size_bytes, file_format, total_records,
                created_by, tenant_id, school_id, status,
                success_count, failure_count, duplicate_count, skipped_count,
                warnings_count, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                batch.id,
                batch.file_name,
                batch.file_size_bytes as i64,
                batch.file_format.to_string(),
                batch.total_records as i64,
                batch.created_by,
                batch.tenant_id,
                batch.school_id,
                batch.status.to_string(),
                batch.success_count as i64,
                batch.failure_count as i64,
                batch.duplicate_count as i64,
                batch.skipped_count as i64,
                batch.warnings_count as i64,
                batch.created_at.to_rfc3339(),
                batch.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    async fn finalize_batch(
        &self,
        batch_id: &str,
        status: BatchStatus,
        summary: &ImportSummary,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            r#"
            UPDATE import_batches SET
                status = ?1,
                success_count = ?2,
                failure_count = ?3,
                duplicate_count = ?4,
                skipped_count = ?5,
                warnings_count = ?6,
                completed_at = ?7
            WHERE id = ?8
            "#,
            params![
                status.to_string(),
                summary.success as i64,
                summary.failure as i64,
                summary.duplicate as i64,
                summary.skipped as i64,
                summary.warnings as i64,
                completed_at.to_rfc3339(),
                batch_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "import_batch".to_string(),
                id: batch_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.lock()?;
        let batch = conn
            .query_row(
                r#"
                SELECT id, file_name, file_size_bytes, file_format, total_records,
                       created_by, tenant_id, school_id, status,
                       success_count, failure_count, duplicate_count, skipped_count,
                       warnings_count, created_at, completed_at
                FROM import_batches WHERE id = ?1
                "#,
                params![batch_id],
                |row| {
                    Ok(ImportBatch {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        file_size_bytes: row.get::<_, i64>(2)? as u64,
                        file_format: parse_file_format(&row.get::<_, String>(3)?),
                        total_records: row.get::<_, i64>(4)? as usize,
                        created_by: row.get(5)?,
                        tenant_id: row.get(6)?,
                        school_id: row.get(7)?,
                        status: parse_batch_status(&row.get::<_, String>(8)?),
                        success_count: row.get::<_, i64>(9)? as usize,
                        failure_count: row.get::<_, i64>(10)? as usize,
                        duplicate_count: row.get::<_, i64>(11)? as usize,
                        skipped_count: row.get::<_, i64>(12)? as usize,
                        warnings_count: row.get::<_, i64>(13)? as usize,
                        created_at: parse_timestamp(&row.get::<_, String>(14)?),
                        completed_at: row
                            .get::<_, Option<String>>(15)?
                            .map(|s| parse_timestamp(&s)),
                    })
                },
            )
            .optional()?;

        Ok(batch)
    }

    async fn insert_import_record(&self, record: &ImportRecord) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_records (
                id, batch_id, row_number, source_data, mapped_data,
                action, status, target_record_id, warning, error_message, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.id,
                record.batch_id,
                record.row_number as i64,
                record.source_data,
                record.mapped_data,
                record.action.to_string(),
                record.status.to_string(),
                record.target_record_id,
                record.warning,
                record.error_message,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn list_import_records(&self, batch_id: &str) -> RepositoryResult<Vec<ImportRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, batch_id, row_number, source_data, mapped_data,
                   action, status, target_record_id, warning, error_message, created_at
            FROM import_records WHERE batch_id = ?1 ORDER BY row_number
            "#,
        )?;

        let records = stmt
            .query_map(params![batch_id], |row| {
                Ok(ImportRecord {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    row_number: row.get::<_, i64>(2)? as usize,
                    source_data: row.get(3)?,
                    mapped_data: row.get(4)?,
                    action: parse_row_action(&row.get::<_, String>(5)?),
                    status: parse_row_status(&row.get::<_, String>(6)?),
                    target_record_id: row.get(7)?,
                    warning: row.get(8)?,
                    error_message: row.get(9)?,
                    created_at: parse_timestamp(&row.get::<_, String>(10)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    async fn save_template(&self, template: &MappingTemplate) -> RepositoryResult<()> {
        let field_mappings = serde_json::to_string(&template.field_mappings)?;
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_configs (id, name, source_system, file_format, field_mappings, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(name) DO UPDATE SET
                source_system = excluded.source_system,
                file_format = excluded.file_format,
                field_mappings = excluded.field_mappings
            "#,
            params![
                template.id,
                template.name,
                template.source_system,
                template.file_format.map(|f| f.to_string()),
                field_mappings,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_template(&self, name: &str) -> RepositoryResult<Option<MappingTemplate>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, name, source_system, file_format, field_mappings
                 FROM import_configs WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, name, source_system, file_format, field_mappings)) => {
                Ok(Some(MappingTemplate {
                    id,
                    name,
                    source_system,
                    file_format: file_format.as_deref().map(parse_file_format),
                    field_mappings: serde_json::from_str(&field_mappings)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<MappingTemplate>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, source_system, file_format, field_mappings
             FROM import_configs ORDER BY name",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut templates = Vec::new();
        for (id, name, source_system, file_format, field_mappings) in rows {
            templates.push(MappingTemplate {
                id,
                name,
                source_system,
                file_format: file_format.as_deref().map(parse_file_format),
                field_mappings: serde_json::from_str(&field_mappings)?,
            });
        }
        Ok(templates)
    }
}

// ==========================================
// Conversões de valor e de enum persistido
// ==========================================

fn cell_to_sql(value: &CellValue) -> Value {
    match value {
        CellValue::Text(s) => Value::Text(s.clone()),
        CellValue::Number(n) => Value::Real(*n),
        CellValue::Bool(b) => Value::Integer(*b as i64),
        CellValue::Null => Value::Null,
    }
}

fn sql_to_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Number(i as f64),
        ValueRef::Real(r) => CellValue::Number(r),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(_) => CellValue::Null,
    }
}

// Enums gravados como TEXT; valores desconhecidos caem no mais
// conservador (compatibilidade com dados antigos)
fn parse_file_format(raw: &str) -> FileFormat {
    match raw {
        "json" => FileFormat::Json,
        "excel" => FileFormat::Excel,
        _ => FileFormat::Csv,
    }
}

fn parse_batch_status(raw: &str) -> BatchStatus {
    match raw {
        "completed" => BatchStatus::Completed,
        "failed" => BatchStatus::Failed,
        _ => BatchStatus::Processing,
    }
}

fn parse_row_status(raw: &str) -> RowStatus {
    match raw {
        "success" => RowStatus::Success,
        "skipped" => RowStatus::Skipped,
        "duplicate" => RowStatus::Duplicate,
        _ => RowStatus::Failed,
    }
}

fn parse_row_action(raw: &str) -> RowAction {
    match raw {
        "insert" => RowAction::Insert,
        "skip" => RowAction::Skip,
        "overwrite" => RowAction::Overwrite,
        "merge" => RowAction::Merge,
        "create_new" => RowAction::CreateNew,
        _ => RowAction::None,
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_store() -> (NamedTempFile, SqliteRecordStore) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteRecordStore::new(file.path().to_str().unwrap()).unwrap();
        (file, store)
    }

    fn student(name: &str, cpf: &str, registration: &str) -> HashMap<String, CellValue> {
        let mut record = HashMap::new();
        record.insert("name".to_string(), CellValue::from(name));
        record.insert("cpf".to_string(), CellValue::from(cpf));
        record.insert(
            "registration_number".to_string(),
            CellValue::from(registration),
        );
        record
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (_file, store) = test_store();

        let id = store
            .insert("students", &student("Ana", "11111111111", "001"))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let mut filters = Filters::new();
        filters.insert("cpf".to_string(), CellValue::from("11111111111"));

        let found = store.find("students", &filters).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(
            found.fields.get("name"),
            Some(&CellValue::Text("Ana".to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_no_match() {
        let (_file, store) = test_store();

        let mut filters = Filters::new();
        filters.insert("cpf".to_string(), CellValue::from("99999999999"));

        assert!(store.find("students", &filters).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_many_preserves_order() {
        let (_file, store) = test_store();
        store
            .insert("students", &student("Ana", "11111111111", "001"))
            .await
            .unwrap();

        let mut hit = Filters::new();
        hit.insert("cpf".to_string(), CellValue::from("11111111111"));
        let mut miss = Filters::new();
        miss.insert("cpf".to_string(), CellValue::from("22222222222"));

        let results = store
            .find_many("students", &[miss.clone(), hit, miss])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_none());
        assert!(results[1].is_some());
        assert!(results[2].is_none());
    }

    #[tokio::test]
    async fn test_update() {
        let (_file, store) = test_store();
        let id = store
            .insert("students", &student("Ana", "11111111111", "001"))
            .await
            .unwrap();

        let mut changes = HashMap::new();
        changes.insert("class_name".to_string(), CellValue::from("5B"));
        store.update("students", &id, &changes).await.unwrap();

        let mut filters = Filters::new();
        filters.insert("cpf".to_string(), CellValue::from("11111111111"));
        let found = store.find("students", &filters).await.unwrap().unwrap();
        assert_eq!(
            found.fields.get("class_name"),
            Some(&CellValue::Text("5B".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let (_file, store) = test_store();
        let mut changes = HashMap::new();
        changes.insert("name".to_string(), CellValue::from("x"));

        let result = store.update("students", "nao-existe", &changes).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let (_file, store) = test_store();
        let result = store.insert("outra_tabela", &HashMap::new()).await;
        assert!(matches!(result, Err(RepositoryError::UnknownTable(_))));
    }

    #[tokio::test]
    async fn test_unknown_filter_column() {
        let (_file, store) = test_store();
        let mut filters = Filters::new();
        filters.insert("coluna_x".to_string(), CellValue::from("v"));

        let result = store.find("students", &filters).await;
        assert!(matches!(result, Err(RepositoryError::UnknownColumn { .. })));
    }

    #[tokio::test]
    async fn test_unknown_record_fields_ignored_on_insert() {
        let (_file, store) = test_store();
        let mut record = student("Ana", "11111111111", "001");
        record.insert("campo_estranho".to_string(), CellValue::from("x"));

        // Não falha: a coluna desconhecida é simplesmente descartada
        store.insert("students", &record).await.unwrap();
    }

    #[tokio::test]
    async fn test_template_roundtrip() {
        use crate::domain::mapping::TemplateEntry;

        let (_file, store) = test_store();

        let mut field_mappings = HashMap::new();
        field_mappings.insert(
            "nome".to_string(),
            TemplateEntry {
                target: "name".to_string(),
                table: "students".to_string(),
                transform: None,
                required: true,
            },
        );

        let template = MappingTemplate {
            id: Uuid::new_v4().to_string(),
            name: "secretaria-2026".to_string(),
            source_system: Some("SED".to_string()),
            file_format: Some(FileFormat::Csv),
            field_mappings,
        };

        store.save_template(&template).await.unwrap();

        let loaded = store
            .load_template("secretaria-2026")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.source_system.as_deref(), Some("SED"));
        assert_eq!(loaded.field_mappings.get("nome").unwrap().target, "name");

        assert_eq!(store.list_templates().await.unwrap().len(), 1);
        assert!(store.load_template("inexistente").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_lifecycle() {
        let (_file, store) = test_store();

        let batch = ImportBatch {
            id: "lote-1".to_string(),
            file_name: "alunos.csv".to_string(),
            file_size_bytes: 128,
            file_format: FileFormat::Csv,
            total_records: 3,
            created_by: "operador".to_string(),
            tenant_id: "t1".to_string(),
            school_id: "e1".to_string(),
            status: BatchStatus::Processing,
            created_at: Utc::now(),
            completed_at: None,
            success_count: 0,
            failure_count: 0,
            duplicate_count: 0,
            skipped_count: 0,
            warnings_count: 0,
        };
        store.insert_batch(&batch).await.unwrap();

        let summary = ImportSummary {
            total: 3,
            success: 2,
            failure: 0,
            duplicate: 0,
            skipped: 1,
            warnings: 1,
        };
        store
            .finalize_batch("lote-1", BatchStatus::Completed, &summary, Utc::now())
            .await
            .unwrap();

        let loaded = store.get_batch("lote-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, BatchStatus::Completed);
        assert_eq!(loaded.success_count, 2);
        assert_eq!(loaded.skipped_count, 1);
        assert!(loaded.completed_at.is_some());
    }
}
