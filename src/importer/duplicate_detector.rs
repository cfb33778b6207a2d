// ==========================================
// Sistema de Gestão Escolar - Detector de Duplicatas
// ==========================================
// Responsabilidade: etapa 4 do pipeline — consulta o armazenamento
// alvo pelos campos de casamento de cada linha válida
// ==========================================
// Campo de casamento vazio na linha é omitido da consulta (não é
// curinga); linha com todos os campos vazios é inserção limpa.
// ==========================================

use crate::domain::duplicate::DuplicateCandidate;
use crate::domain::record::MappedRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::record_importer_trait::DuplicateDetector;
use crate::repository::record_store::{Filters, RecordStore};
use async_trait::async_trait;
use tracing::{debug, info};

pub struct MatchFieldDetector;

impl MatchFieldDetector {
    /// Filtros da linha: apenas campos de casamento com valor não
    /// vazio
    fn filters_for(row: &MappedRow, match_fields: &[String]) -> Filters {
        let mut filters = Filters::new();
        for field in match_fields {
            if let Some(value) = row.mapped.get(field) {
                if !value.is_blank() {
                    filters.insert(field.clone(), value.clone());
                }
            }
        }
        filters
    }
}

#[async_trait]
impl DuplicateDetector for MatchFieldDetector {
    async fn detect(
        &self,
        store: &dyn RecordStore,
        table: &str,
        match_fields: &[String],
        rows: &[MappedRow],
    ) -> ImportResult<Vec<DuplicateCandidate>> {
        // Monta as consultas preservando a ordem das linhas
        let mut queried_rows: Vec<&MappedRow> = Vec::new();
        let mut queries: Vec<Filters> = Vec::new();

        for row in rows {
            let filters = Self::filters_for(row, match_fields);
            if filters.is_empty() {
                debug!(
                    row = row.row_number,
                    "linha sem campos de casamento preenchidos, inserção limpa"
                );
                continue;
            }
            queried_rows.push(row);
            queries.push(filters);
        }

        let results = store
            .find_many(table, &queries)
            .await
            .map_err(|e| ImportError::StoreError(e.to_string()))?;

        let mut candidates = Vec::new();
        for (row, existing) in queried_rows.into_iter().zip(results) {
            if let Some(existing) = existing {
                debug!(
                    row = row.row_number,
                    existing_id = %existing.id,
                    "duplicata detectada"
                );
                candidates.push(DuplicateCandidate {
                    source_row: row.row_number,
                    existing,
                    incoming: row.clone(),
                });
            }
        }

        info!(
            total = rows.len(),
            duplicatas = candidates.len(),
            tabela = table,
            "detecção de duplicatas concluída"
        );

        Ok(candidates)
    }
}
