// ==========================================
// Testes de integração do RecordImporter
// ==========================================
// Alvo: pipeline completo não assistido (parse → mapeamento →
// validação → deduplicação → commit) contra SQLite real
// ==========================================


use escola_import::config::ConfigManager;
use escola_import::domain::types::{BatchStatus, RecordType, RowStatus};
use escola_import::importer::record_importer_trait::RecordImporter;
use escola_import::importer::validator::RecordValidator;
use escola_import::importer::{
    AutoMapper, BatchCommitterImpl, ImportError, MatchFieldDetector, RecordImporterImpl,
};
use escola_import::logging;
use escola_import::repository::{RecordStore, SqliteRecordStore};
use test_helpers::{create_test_db, open_config, open_store, seed_student, test_tenant, write_fixture, STUDENTS_CSV};

/// Monta o importador completo sobre um banco de teste
fn create_test_importer(
    db_path: &str,
    record_type: RecordType,
) -> RecordImporterImpl<SqliteRecordStore, ConfigManager> {
    let store = open_store(db_path);
    let config = open_config(db_path);

    RecordImporterImpl::new(
        store,
        config,
        Box::new(AutoMapper),
        Box::new(RecordValidator::with_default_rules(record_type)),
        Box::new(MatchFieldDetector),
        Box::new(BatchCommitterImpl),
    )
}

#[tokio::test]
async fn test_import_csv_into_empty_store() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    let csv = write_fixture(".csv", STUDENTS_CSV);
    let importer = create_test_importer(&db_path, RecordType::Student);

    let outcome = importer
        .import_file(csv.path(), RecordType::Student, &test_tenant())
        .await
        .expect("importação deve concluir");

    // Banco vazio: nenhuma duplicata detectável; as 3 linhas entram
    assert_eq!(outcome.summary.total, 3);
    assert_eq!(outcome.summary.success, 3);
    assert_eq!(outcome.summary.failure, 0);
    assert!(outcome.summary.is_conserved());
    assert_eq!(outcome.batch.status, BatchStatus::Completed);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn test_import_skips_preexisting_duplicates() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    // Ana já existe no armazenamento com os mesmos campos de
    // casamento (CPF já normalizado em dígitos)
    let verify_store = open_store(&db_path);
    seed_student(
        &verify_store,
        &[
            ("name", "Ana"),
            ("cpf", "11111111111"),
            ("registration_number", "001"),
        ],
    )
    .await;

    let csv = write_fixture(".csv", STUDENTS_CSV);
    let importer = create_test_importer(&db_path, RecordType::Student);

    let outcome = importer
        .import_file(csv.path(), RecordType::Student, &test_tenant())
        .await
        .expect("importação deve concluir");

    // Linhas 1 e 3 casam com a Ana existente e são puladas (skip é o
    // padrão fail-safe); apenas Beto entra
    assert_eq!(outcome.summary.total, 3);
    assert_eq!(outcome.summary.success, 1);
    assert_eq!(outcome.summary.skipped, 2);
    assert_eq!(outcome.summary.duplicate, 0);
    assert_eq!(outcome.summary.failure, 0);
    assert!(outcome.summary.is_conserved());

    let skipped: Vec<usize> = outcome
        .records
        .iter()
        .filter(|r| r.status == RowStatus::Skipped)
        .map(|r| r.row_number)
        .collect();
    assert_eq!(skipped, vec![1, 3]);

    // Armazenamento: Ana original + Beto
    let mut filters = std::collections::HashMap::new();
    filters.insert(
        "cpf".to_string(),
        escola_import::CellValue::from("22222222222"),
    );
    let beto = verify_store.find("students", &filters).await.unwrap();
    assert!(beto.is_some(), "Beto deve ter sido inserido");
}

#[tokio::test]
async fn test_invalid_rows_counted_as_failed() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    // Segunda linha sem nome (campo obrigatório para alunos)
    let csv = write_fixture(
        ".csv",
        "nome,cpf,matricula\nAna,111.111.111-11,001\n,222.222.222-22,002\n",
    );

    let importer = create_test_importer(&db_path, RecordType::Student);
    let outcome = importer
        .import_file(csv.path(), RecordType::Student, &test_tenant())
        .await
        .expect("importação deve concluir mesmo com linha inválida");

    assert_eq!(outcome.summary.total, 2);
    assert_eq!(outcome.summary.success, 1);
    assert_eq!(outcome.summary.failure, 1);
    assert!(outcome.summary.is_conserved());

    let failed = outcome
        .records
        .iter()
        .find(|r| r.status == RowStatus::Failed)
        .expect("linha inválida registrada na auditoria");
    assert_eq!(failed.row_number, 2);
    assert!(failed.error_message.is_some());
}

#[tokio::test]
async fn test_warnings_are_additive_not_exclusive() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    // CPF estruturalmente inválido gera warning mas a linha entra
    let csv = write_fixture(".csv", "nome,cpf\nAna,123.456.789-00\n");

    let importer = create_test_importer(&db_path, RecordType::Student);
    let outcome = importer
        .import_file(csv.path(), RecordType::Student, &test_tenant())
        .await
        .unwrap();

    assert_eq!(outcome.summary.success, 1);
    assert_eq!(outcome.summary.warnings, 1);
    assert!(outcome.summary.is_conserved());
    assert!(outcome.records[0].warning.is_some());
}

#[tokio::test]
async fn test_unsupported_format_is_fatal() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    let file = write_fixture(".pdf", "não é tabular");
    let importer = create_test_importer(&db_path, RecordType::Student);

    let result = importer
        .import_file(file.path(), RecordType::Student, &test_tenant())
        .await;

    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_import_json_professionals() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    let json = write_fixture(
        ".json",
        r#"{"data":[
            {"nome":"Carla Lima","cargo":"Professora","cpf":"529.982.247-25"},
            {"nome":"Davi Rocha","cargo":"Coordenador","cpf":"52998224725"}
        ]}"#,
    );

    let importer = create_test_importer(&db_path, RecordType::Professional);
    let outcome = importer
        .import_file(json.path(), RecordType::Professional, &test_tenant())
        .await
        .unwrap();

    // As duas linhas têm o mesmo CPF normalizado: a segunda ainda não
    // é duplicata (a primeira entra no mesmo lote, após a detecção)
    assert_eq!(outcome.summary.total, 2);
    assert_eq!(outcome.summary.success, 2);
    assert!(outcome.summary.is_conserved());

    let verify_store = open_store(&db_path);
    let mut filters = std::collections::HashMap::new();
    filters.insert(
        "cpf".to_string(),
        escola_import::CellValue::from("52998224725"),
    );
    assert!(verify_store
        .find("professionals", &filters)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_batch_persisted_with_final_counters() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db();

    let csv = write_fixture(".csv", STUDENTS_CSV);
    let importer = create_test_importer(&db_path, RecordType::Student);

    let outcome = importer
        .import_file(csv.path(), RecordType::Student, &test_tenant())
        .await
        .unwrap();

    let verify_store = open_store(&db_path);
    let stored = verify_store
        .get_batch(&outcome.batch.id)
        .await
        .unwrap()
        .expect("lote persistido");

    assert_eq!(stored.status, BatchStatus::Completed);
    assert_eq!(stored.total_records, 3);
    assert_eq!(stored.success_count, outcome.summary.success);
    assert_eq!(stored.tenant_id, "tenant-teste");
    assert!(stored.completed_at.is_some());

    let records = verify_store
        .list_import_records(&outcome.batch.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    // Em ordem de linha, com os dados originais preservados
    assert_eq!(records[0].row_number, 1);
    assert!(records[0].source_data.contains("Ana"));
}
