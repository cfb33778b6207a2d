// ==========================================
// Sistema de Gestão Escolar - Tipos de Domínio
// ==========================================
// Enumerações compartilhadas do pipeline de importação
// Serialização: snake_case (alinhado ao banco)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Formato de Arquivo (File Format)
// ==========================================
// Classificado pela extensão do arquivo enviado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Json,
    Excel,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Json => write!(f, "json"),
            FileFormat::Excel => write!(f, "excel"),
        }
    }
}

// ==========================================
// Tipo de Registro (Record Type)
// ==========================================
// Selecionado pelo operador antes do upload; define o esquema alvo,
// os campos enumerados e os campos de deduplicação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Student,
    Professional,
    // Suportado apenas para resolução de tabela
    User,
}

impl RecordType {
    /// Tabela primária do tipo de registro
    pub fn primary_table(&self) -> &'static str {
        match self {
            RecordType::Student => "students",
            RecordType::Professional => "professionals",
            RecordType::User => "users",
        }
    }

    /// Campos alvo enumerados (lista apresentada ao operador)
    pub fn target_fields(&self) -> &'static [&'static str] {
        match self {
            RecordType::Student => &[
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
            ],
            RecordType::Professional => &[
                "full_name",
                "cpf",
                "registration_number",
                "professional_role",
                "hire_date",
                "termination_date",
                "email",
                "phone",
            ],
            RecordType::User => &["name", "email", "cpf"],
        }
    }

    /// Campos cuja ausência bloqueia a importação da linha
    pub fn default_required_fields(&self) -> &'static [&'static str] {
        match self {
            RecordType::Student => &["name"],
            RecordType::Professional => &["full_name", "cpf"],
            RecordType::User => &["name", "email"],
        }
    }

    /// Campos de deduplicação padrão (ordem significativa)
    pub fn default_match_fields(&self) -> &'static [&'static str] {
        match self {
            RecordType::Student => &["cpf", "registration_number"],
            RecordType::Professional => &["cpf", "email"],
            RecordType::User => &["email"],
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Student => write!(f, "student"),
            RecordType::Professional => write!(f, "professional"),
            RecordType::User => write!(f, "user"),
        }
    }
}

// ==========================================
// Transformação de Valor (Transform Kind)
// ==========================================
// Conjunto fixo de transformações declarativas aplicadas ao
// preparar os dados mapeados (uma única vez por valor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Uppercase,
    Lowercase,
    Trim,
    CpfFormat,
    PhoneFormat,
    DateBrToIso,
    Boolean,
}

impl TransformKind {
    /// Todas as transformações disponíveis ao operador
    pub const ALL: &'static [TransformKind] = &[
        TransformKind::Uppercase,
        TransformKind::Lowercase,
        TransformKind::Trim,
        TransformKind::CpfFormat,
        TransformKind::PhoneFormat,
        TransformKind::DateBrToIso,
        TransformKind::Boolean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Uppercase => "uppercase",
            TransformKind::Lowercase => "lowercase",
            TransformKind::Trim => "trim",
            TransformKind::CpfFormat => "cpf_format",
            TransformKind::PhoneFormat => "phone_format",
            TransformKind::DateBrToIso => "date_br_to_iso",
            TransformKind::Boolean => "boolean",
        }
    }

    /// Resolve o nome serializado de volta para a enumeração
    pub fn parse(name: &str) -> Option<TransformKind> {
        TransformKind::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Severidade de Regra (Rule Severity)
// ==========================================
// Error bloqueia a linha; Warning é informativo e não bloqueia
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    Warning,
    Error,
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSeverity::Warning => write!(f, "warning"),
            RuleSeverity::Error => write!(f, "error"),
        }
    }
}

// ==========================================
// Classificador de Formato de Campo (Field Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Email,
}

// ==========================================
// Ação de Resolução de Duplicata (Duplicate Action)
// ==========================================
// Padrão quando não resolvida: Skip (nunca sobrescreve em silêncio)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAction {
    Skip,
    Overwrite,
    Merge,
    CreateNew,
}

impl fmt::Display for DuplicateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateAction::Skip => write!(f, "skip"),
            DuplicateAction::Overwrite => write!(f, "overwrite"),
            DuplicateAction::Merge => write!(f, "merge"),
            DuplicateAction::CreateNew => write!(f, "create_new"),
        }
    }
}

// ==========================================
// Status do Lote de Importação (Batch Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Processing => write!(f, "processing"),
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Failed => write!(f, "failed"),
        }
    }
}

// ==========================================
// Status de Linha (Row Status)
// ==========================================
// Cada linha de origem termina em exatamente um status terminal;
// warnings são ortogonais (flag em ImportRecord)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Success,
    Failed,
    Skipped,
    Duplicate,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Success => write!(f, "success"),
            RowStatus::Failed => write!(f, "failed"),
            RowStatus::Skipped => write!(f, "skipped"),
            RowStatus::Duplicate => write!(f, "duplicate"),
        }
    }
}

// ==========================================
// Ação Aplicada à Linha (Row Action)
// ==========================================
// Registrada na trilha de auditoria (import_records.action)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Insert,
    Skip,
    Overwrite,
    Merge,
    CreateNew,
    None,
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowAction::Insert => write!(f, "insert"),
            RowAction::Skip => write!(f, "skip"),
            RowAction::Overwrite => write!(f, "overwrite"),
            RowAction::Merge => write!(f, "merge"),
            RowAction::CreateNew => write!(f, "create_new"),
            RowAction::None => write!(f, "none"),
        }
    }
}
