// ==========================================
// Sistema de Gestão Escolar - Parser de Arquivos
// ==========================================
// Responsabilidade: etapa 1 do pipeline — arquivo enviado → forma
// tabular uniforme (cabeçalhos + linhas)
// Suporta: CSV (.csv) / JSON (.json) / Excel (.xlsx/.xls)
// ==========================================

use crate::domain::record::{CellValue, FileInfo, ParsedFile, RawRow};
use crate::domain::types::FileFormat;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::record_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Limite padrão de tamanho do arquivo enviado (10 MB)
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Classifica o formato pela extensão do arquivo
pub fn detect_format(path: &Path) -> ImportResult<FileFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => Ok(FileFormat::Csv),
        "json" => Ok(FileFormat::Json),
        "xlsx" | "xls" => Ok(FileFormat::Excel),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

/// Metadados do arquivo, com verificação de existência e de tamanho
fn read_file_info(path: &Path, format: FileFormat, max_size: u64) -> ImportResult<FileInfo> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let size_bytes = std::fs::metadata(path)?.len();
    if size_bytes > max_size {
        return Err(ImportError::FileTooLarge {
            size_bytes,
            limit_bytes: max_size,
        });
    }

    Ok(FileInfo {
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("desconhecido")
            .to_string(),
        size_bytes,
        format,
    })
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, path: &Path, max_size: u64) -> ImportResult<ParsedFile> {
        let file_info = read_file_info(path, FileFormat::Csv, max_size)?;

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // linhas de comprimento desigual não abortam
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = RawRow::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), CellValue::Text(value.trim().to_string()));
                }
            }

            // Linhas totalmente em branco são ignoradas
            if row.values().all(CellValue::is_blank) {
                continue;
            }

            rows.push(row);
        }

        Ok(ParsedFile {
            headers,
            rows,
            file_info,
        })
    }
}

// ==========================================
// JSON Parser
// ==========================================
// Aceita array de objetos no topo, ou objeto com propriedade "data"
pub struct JsonParser;

impl FileParser for JsonParser {
    fn parse(&self, path: &Path, max_size: u64) -> ImportResult<ParsedFile> {
        let file_info = read_file_info(path, FileFormat::Json, max_size)?;

        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        let elements = match &value {
            serde_json::Value::Array(arr) => arr.as_slice(),
            serde_json::Value::Object(obj) => match obj.get("data") {
                Some(serde_json::Value::Array(arr)) => arr.as_slice(),
                _ => return Err(ImportError::InvalidJsonShape),
            },
            _ => return Err(ImportError::InvalidJsonShape),
        };

        // Cabeçalhos = conjunto de chaves do primeiro elemento, na
        // ordem de origem (array vazio → sem cabeçalhos)
        let headers: Vec<String> = match elements.first() {
            Some(serde_json::Value::Object(first)) => first.keys().cloned().collect(),
            Some(_) => return Err(ImportError::InvalidJsonShape),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for element in elements {
            let obj = match element {
                serde_json::Value::Object(obj) => obj,
                _ => return Err(ImportError::InvalidJsonShape),
            };

            let mut row = RawRow::new();
            for header in &headers {
                if let Some(v) = obj.get(header) {
                    row.insert(header.clone(), json_scalar(v));
                }
            }
            rows.push(row);
        }

        Ok(ParsedFile {
            headers,
            rows,
            file_info,
        })
    }
}

/// Converte um valor JSON para o escalar de célula; estruturas
/// aninhadas são serializadas como texto
fn json_scalar(value: &serde_json::Value) -> CellValue {
    match value {
        serde_json::Value::String(s) => CellValue::Text(s.clone()),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        serde_json::Value::Bool(b) => CellValue::Bool(*b),
        serde_json::Value::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ==========================================
// Excel Parser
// ==========================================
// Somente a primeira planilha; linha 1 = cabeçalho; dados a partir
// da linha 2
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, path: &Path, max_size: u64) -> ImportResult<ParsedFile> {
        let file_info = read_file_info(path, FileFormat::Excel, max_size)?;

        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::SpreadsheetParseError("arquivo sem planilhas".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows.next().ok_or_else(|| {
            ImportError::SpreadsheetParseError("planilha sem linha de cabeçalho".to_string())
        })?;

        // Células de cabeçalho em branco recebem rótulo sintético
        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let label = excel_cell_text(cell);
                if label.is_empty() {
                    format!("Coluna{}", idx + 1)
                } else {
                    label
                }
            })
            .collect();

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            // Todas as colunas presentes em toda linha (célula ausente
            // → string vazia), preservando o alinhamento linha/coluna
            let mut row = RawRow::new();
            for (col_idx, header) in headers.iter().enumerate() {
                let value = data_row
                    .get(col_idx)
                    .map(excel_cell_text)
                    .unwrap_or_default();
                row.insert(header.clone(), CellValue::Text(value));
            }

            if row.values().all(CellValue::is_blank) {
                continue;
            }

            rows.push(row);
        }

        Ok(ParsedFile {
            headers,
            rows,
            file_info,
        })
    }
}

/// Texto de uma célula: datas no formato AAAA-MM-DD, demais tipos
/// na forma textual
fn excel_cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.chars().take(10).collect(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
        Data::Empty => String::new(),
    }
}

// ==========================================
// Parser Universal (seleção automática pela extensão)
// ==========================================
pub struct UniversalFileParser {
    max_file_size_bytes: u64,
}

impl Default for UniversalFileParser {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

impl UniversalFileParser {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            max_file_size_bytes,
        }
    }

    pub fn parse<P: AsRef<Path>>(&self, path: P) -> ImportResult<ParsedFile> {
        let path = path.as_ref();
        let format = detect_format(path)?;

        let parser: Box<dyn FileParser> = match format {
            FileFormat::Csv => Box::new(CsvParser),
            FileFormat::Json => Box::new(JsonParser),
            FileFormat::Excel => Box::new(ExcelParser),
        };

        parser.parse(path, self.max_file_size_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a.csv")).unwrap(), FileFormat::Csv);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), FileFormat::Json);
        assert_eq!(detect_format(Path::new("a.xlsx")).unwrap(), FileFormat::Excel);
        assert_eq!(detect_format(Path::new("a.XLS")).unwrap(), FileFormat::Excel);
        assert!(detect_format(Path::new("a.pdf")).is_err());
        assert!(detect_format(Path::new("semextensao")).is_err());
    }

    #[test]
    fn test_csv_parser_basic() {
        let file = write_temp(".csv", "nome,cpf,matricula\nAna,111.111.111-11,001\nBeto,222.222.222-22,002\n");

        let parsed = CsvParser
            .parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES)
            .unwrap();

        assert_eq!(parsed.headers, vec!["nome", "cpf", "matricula"]);
        assert_eq!(parsed.total_rows(), 2);
        assert_eq!(
            parsed.rows[0].get("nome"),
            Some(&CellValue::Text("Ana".to_string()))
        );
        assert_eq!(parsed.file_info.format, FileFormat::Csv);
    }

    #[test]
    fn test_csv_parser_skips_blank_lines() {
        let file = write_temp(".csv", "nome,cpf\nAna,111\n,\nBeto,222\n");

        let parsed = CsvParser
            .parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES)
            .unwrap();

        assert_eq!(parsed.total_rows(), 2);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse(Path::new("inexistente.csv"), DEFAULT_MAX_FILE_SIZE_BYTES);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_file_too_large() {
        let file = write_temp(".csv", "nome\nAna\n");
        let result = CsvParser.parse(file.path(), 3);
        assert!(matches!(result, Err(ImportError::FileTooLarge { .. })));
    }

    #[test]
    fn test_json_parser_top_level_array() {
        let file = write_temp(
            ".json",
            r#"[{"nome":"Ana","idade":10},{"nome":"Beto","idade":11}]"#,
        );

        let parsed = JsonParser
            .parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES)
            .unwrap();

        assert_eq!(parsed.headers, vec!["nome", "idade"]);
        assert_eq!(parsed.total_rows(), 2);
        assert_eq!(
            parsed.rows[1].get("idade"),
            Some(&CellValue::Number(11.0))
        );
    }

    #[test]
    fn test_json_parser_data_property() {
        let file = write_temp(".json", r#"{"data":[{"nome":"Ana","ativo":true}]}"#);

        let parsed = JsonParser
            .parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES)
            .unwrap();

        assert_eq!(parsed.headers, vec!["nome", "ativo"]);
        assert_eq!(parsed.rows[0].get("ativo"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_json_parser_empty_array() {
        let file = write_temp(".json", "[]");

        let parsed = JsonParser
            .parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES)
            .unwrap();

        assert!(parsed.headers.is_empty());
        assert_eq!(parsed.total_rows(), 0);
    }

    #[test]
    fn test_json_parser_invalid_shape() {
        let file = write_temp(".json", r#"{"outra":"coisa"}"#);
        let result = JsonParser.parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES);
        assert!(matches!(result, Err(ImportError::InvalidJsonShape)));

        let scalar = write_temp(".json", "42");
        let result = JsonParser.parse(scalar.path(), DEFAULT_MAX_FILE_SIZE_BYTES);
        assert!(matches!(result, Err(ImportError::InvalidJsonShape)));
    }

    #[test]
    fn test_json_parser_malformed() {
        let file = write_temp(".json", "{nada valido");
        let result = JsonParser.parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES);
        assert!(matches!(result, Err(ImportError::JsonParseError(_))));
    }

    #[test]
    fn test_json_rows_restricted_to_headers() {
        // Chave extra fora do primeiro elemento não vira coluna
        let file = write_temp(
            ".json",
            r#"[{"nome":"Ana"},{"nome":"Beto","extra":"x"}]"#,
        );

        let parsed = JsonParser
            .parse(file.path(), DEFAULT_MAX_FILE_SIZE_BYTES)
            .unwrap();

        assert_eq!(parsed.headers, vec!["nome"]);
        for row in &parsed.rows {
            for key in row.keys() {
                assert!(parsed.headers.contains(key));
            }
        }
    }

    #[test]
    fn test_universal_parser_unsupported() {
        let file = write_temp(".txt", "qualquer coisa");
        let parser = UniversalFileParser::default();
        assert!(matches!(
            parser.parse(file.path()),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
