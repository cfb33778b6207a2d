// ==========================================
// Sistema de Gestão Escolar - Conexão SQLite
// ==========================================
// Unifica os PRAGMAs de toda Connection::open do projeto: chaves
// estrangeiras ligadas e busy_timeout único, evitando comportamento
// divergente entre módulos
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// busy_timeout padrão (milissegundos)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Aplica os PRAGMAs unificados a uma conexão.
///
/// foreign_keys e busy_timeout valem por conexão, não por banco —
/// toda conexão nova precisa passar por aqui.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Abre uma conexão SQLite já configurada
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}
