// ==========================================
// Sistema de Gestão Escolar - Duplicatas
// ==========================================
// Candidatas detectadas contra o armazenamento alvo e a planilha
// lateral de decisões do operador
// ==========================================

use crate::domain::record::{MappedRow, StoredRecord};
use crate::domain::types::DuplicateAction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// DuplicateCandidate - Linha com Correspondência Existente
// ==========================================
// Nunca mutada após a detecção; a resolução vive em ResolutionSheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    /// Número da linha no arquivo original (1-based)
    pub source_row: usize,
    /// Registro correspondente já presente no armazenamento
    pub existing: StoredRecord,
    /// Linha de entrada mapeada e transformada
    pub incoming: MappedRow,
}

// ==========================================
// ResolutionSheet - Decisões por Linha
// ==========================================
// source_row → ação; linhas não tocadas recebem Skip na finalização
// (fail-safe: nada é sobrescrito em silêncio)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionSheet {
    decisions: HashMap<usize, DuplicateAction>,
}

impl ResolutionSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra a decisão explícita de uma linha
    pub fn resolve(&mut self, source_row: usize, action: DuplicateAction) {
        self.decisions.insert(source_row, action);
    }

    /// Ação global: estampa a mesma decisão em todas as duplicatas
    /// ainda pendentes
    pub fn resolve_all_pending(
        &mut self,
        candidates: &[DuplicateCandidate],
        action: DuplicateAction,
    ) {
        for candidate in candidates {
            self.decisions.entry(candidate.source_row).or_insert(action);
        }
    }

    pub fn decision_for(&self, source_row: usize) -> Option<DuplicateAction> {
        self.decisions.get(&source_row).copied()
    }

    /// Quantidade de duplicatas sem decisão registrada
    pub fn pending_count(&self, candidates: &[DuplicateCandidate]) -> usize {
        candidates
            .iter()
            .filter(|c| !self.decisions.contains_key(&c.source_row))
            .count()
    }

    /// Fecha a planilha: toda duplicata sem decisão explícita vira Skip
    pub fn finalize(&mut self, candidates: &[DuplicateCandidate]) {
        for candidate in candidates {
            self.decisions
                .entry(candidate.source_row)
                .or_insert(DuplicateAction::Skip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{MappedRow, StoredRecord};
    use std::collections::HashMap;

    fn candidate(source_row: usize) -> DuplicateCandidate {
        DuplicateCandidate {
            source_row,
            existing: StoredRecord {
                id: format!("id-{}", source_row),
                fields: HashMap::new(),
            },
            incoming: MappedRow {
                row_number: source_row,
                source: HashMap::new(),
                mapped: HashMap::new(),
            },
        }
    }

    #[test]
    fn test_pending_count() {
        let candidates = vec![candidate(1), candidate(3), candidate(5)];
        let mut sheet = ResolutionSheet::new();
        assert_eq!(sheet.pending_count(&candidates), 3);

        sheet.resolve(3, DuplicateAction::Overwrite);
        assert_eq!(sheet.pending_count(&candidates), 2);
    }

    #[test]
    fn test_finalize_defaults_to_skip() {
        let candidates = vec![candidate(1), candidate(2), candidate(3)];
        let mut sheet = ResolutionSheet::new();
        sheet.resolve(2, DuplicateAction::Merge);

        sheet.finalize(&candidates);

        assert_eq!(sheet.pending_count(&candidates), 0);
        assert_eq!(sheet.decision_for(1), Some(DuplicateAction::Skip));
        assert_eq!(sheet.decision_for(2), Some(DuplicateAction::Merge));
        assert_eq!(sheet.decision_for(3), Some(DuplicateAction::Skip));
    }

    #[test]
    fn test_resolve_all_pending_keeps_explicit_decisions() {
        let candidates = vec![candidate(1), candidate(2)];
        let mut sheet = ResolutionSheet::new();
        sheet.resolve(1, DuplicateAction::CreateNew);

        sheet.resolve_all_pending(&candidates, DuplicateAction::Overwrite);

        assert_eq!(sheet.decision_for(1), Some(DuplicateAction::CreateNew));
        assert_eq!(sheet.decision_for(2), Some(DuplicateAction::Overwrite));
    }
}
