// ==========================================
// Sistema de Gestão Escolar - Importador (CLI)
// ==========================================
// Importação não assistida de um arquivo de alunos ou profissionais
// contra o banco SQLite local:
//   escola-import <arquivo> <student|professional> [db_path]
// Duplicatas são resolvidas como skip (fail-safe).
// ==========================================

use escola_import::config::ConfigManager;
use escola_import::domain::batch::{error_log_content, error_log_filename, TenantContext};
use escola_import::domain::types::RecordType;
use escola_import::importer::record_importer_trait::RecordImporter;
use escola_import::importer::{
    AutoMapper, BatchCommitterImpl, MatchFieldDetector, RecordImporterImpl,
};
use escola_import::importer::validator::RecordValidator;
use escola_import::repository::SqliteRecordStore;
use escola_import::{logging, APP_NAME, VERSION};
use std::path::PathBuf;

/// Caminho padrão do banco: diretório de dados do usuário
fn default_db_path() -> String {
    let dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join("escola-import")
        .join("escola.db")
        .to_string_lossy()
        .to_string()
}

fn usage() -> ! {
    eprintln!("uso: escola-import <arquivo> <student|professional> [db_path]");
    eprintln!("     formatos aceitos: .csv / .json / .xlsx / .xls");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let mut args = std::env::args().skip(1);
    let file_path = args.next().unwrap_or_else(|| usage());
    let record_type = match args.next().as_deref() {
        Some("student") => RecordType::Student,
        Some("professional") => RecordType::Professional,
        _ => usage(),
    };
    let db_path = args.next().unwrap_or_else(default_db_path);

    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(banco = %db_path, "usando banco de dados");

    let store = SqliteRecordStore::new(&db_path)?;
    let config = ConfigManager::new(&db_path)?;

    let importer = RecordImporterImpl::new(
        store,
        config,
        Box::new(AutoMapper),
        Box::new(RecordValidator::with_default_rules(record_type)),
        Box::new(MatchFieldDetector),
        Box::new(BatchCommitterImpl),
    );

    let tenant = TenantContext {
        tenant_id: "local".to_string(),
        school_id: "local".to_string(),
        user_id: whoami(),
    };

    let outcome = importer
        .import_file(&file_path, record_type, &tenant)
        .await?;

    println!("lote {} ({})", outcome.batch.id, outcome.batch.status);
    println!("  total:      {}", outcome.summary.total);
    println!("  sucesso:    {}", outcome.summary.success);
    println!("  falha:      {}", outcome.summary.failure);
    println!("  duplicatas: {}", outcome.summary.duplicate);
    println!("  ignoradas:  {}", outcome.summary.skipped);
    println!("  avisos:     {}", outcome.summary.warnings);

    // Log de erros ao lado do arquivo importado, quando houver falhas
    if outcome.summary.failure > 0 {
        let log = error_log_content(&outcome.records);
        let log_path = error_log_filename(&outcome.batch.id);
        std::fs::write(&log_path, log)?;
        println!("log de erros: {}", log_path);
    }

    Ok(())
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "operador".to_string())
}
