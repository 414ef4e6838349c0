use crate::core::RecipientId;
use crate::utils::error::{DispatchError, Result};
use std::io::Read;
use std::path::Path;

/// 依優先順序探測的欄位名稱（大小寫敏感）
pub const RECIPIENT_COLUMNS: &[&str] = &[
    "phone", "Phone", "PHONE", "number", "Number", "contact", "Contact",
];

/// CSV 轉換結果；`skipped_rows` 讓呼叫端察覺被略過的資料列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecipients {
    pub recipients: Vec<RecipientId>,
    pub skipped_rows: usize,
}

/// JSON 陣列轉收件人序列：必須是非空陣列，且每個元素都是非空字串
pub fn recipients_from_json(value: &serde_json::Value) -> Result<Vec<RecipientId>> {
    let items = value
        .as_array()
        .ok_or_else(|| DispatchError::validation("Recipients must be an array"))?;

    if items.is_empty() {
        return Err(DispatchError::validation("No valid recipients provided"));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let text = item.as_str().ok_or_else(|| {
                DispatchError::validation(format!("Recipient at index {} is not a string", index))
            })?;
            RecipientId::parse(text).map_err(|_| {
                DispatchError::validation(format!("Recipient at index {} is empty", index))
            })
        })
        .collect()
}

/// 讀取 JSON 陣列檔案（CLI 的 `--recipients-file`）
pub fn recipients_from_list_file<P: AsRef<Path>>(path: P) -> Result<Vec<RecipientId>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    recipients_from_json(&value)
}

/// 去掉所有空白與開頭的 `+`
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.strip_prefix('+').unwrap_or(compact.as_str()).to_string()
}

/// 從帶標頭的 CSV 取出收件人。
///
/// 每列依 [`RECIPIENT_COLUMNS`] 順序找第一個有值的欄位；找不到的列直接略過並計數，不視為錯誤。
/// 完全沒有符合的列時回傳空序列，由後續驗證回報「沒有收件人」。
pub fn recipients_from_csv<R: Read>(reader: R) -> Result<CsvRecipients> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column_indexes: Vec<usize> = RECIPIENT_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name))
        .collect();

    if column_indexes.is_empty() {
        tracing::warn!(
            "CSV header has no recognized recipient column (expected one of: {})",
            RECIPIENT_COLUMNS.join(", ")
        );
    }

    let mut recipients = Vec::new();
    let mut skipped_rows = 0;

    for (row_number, record) in csv_reader.records().enumerate() {
        let record = record?;
        let found = column_indexes
            .iter()
            .filter_map(|&index| record.get(index))
            .map(normalize_phone)
            .find(|value| !value.is_empty());

        match found.map(RecipientId::parse) {
            Some(Ok(recipient)) => recipients.push(recipient),
            _ => {
                tracing::debug!("Skipping CSV row {}: no recipient value", row_number + 2);
                skipped_rows += 1;
            }
        }
    }

    if skipped_rows > 0 {
        tracing::warn!(
            "⚠️ Skipped {} CSV row(s) without a recipient value",
            skipped_rows
        );
    }

    Ok(CsvRecipients {
        recipients,
        skipped_rows,
    })
}

pub fn recipients_from_csv_path<P: AsRef<Path>>(path: P) -> Result<CsvRecipients> {
    let file = std::fs::File::open(path)?;
    recipients_from_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(recipients: &[RecipientId]) -> Vec<&str> {
        recipients.iter().map(|r| r.as_str()).collect()
    }

    #[test]
    fn test_json_list_accepts_strings() {
        let recipients = recipients_from_json(&json!(["111", "222", "111"])).unwrap();
        assert_eq!(ids(&recipients), vec!["111", "222", "111"]);
    }

    #[test]
    fn test_json_list_trims_surrounding_whitespace() {
        let recipients = recipients_from_json(&json!([" 111 ", "\t222"])).unwrap();
        assert_eq!(ids(&recipients), vec!["111", "222"]);
        assert!(recipients_from_json(&json!(["111", "   "])).is_err());
    }

    #[test]
    fn test_json_list_rejects_bad_shapes() {
        assert!(recipients_from_json(&json!([])).is_err());
        assert!(recipients_from_json(&json!("111")).is_err());
        assert!(recipients_from_json(&json!(["111", 222])).is_err());
        assert!(recipients_from_json(&json!(["111", ""])).is_err());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 555 0001"), "15550001");
        assert_eq!(normalize_phone(" 447700900123 "), "447700900123");
        assert_eq!(normalize_phone("+"), "");
    }

    #[test]
    fn test_csv_phone_column_and_skipped_row() {
        let data = "name,phone\n\"Alice\",\"+1 555 0001\"\n\"Bob\",\"\"\n";
        let result = recipients_from_csv(data.as_bytes()).unwrap();

        assert_eq!(ids(&result.recipients), vec!["15550001"]);
        assert_eq!(result.skipped_rows, 1);
    }

    #[test]
    fn test_csv_column_priority() {
        // phone 優先於 number；phone 空白時退回 number
        let data = "number,phone\n111,222\n333,\n";
        let result = recipients_from_csv(data.as_bytes()).unwrap();

        assert_eq!(ids(&result.recipients), vec!["222", "333"]);
        assert_eq!(result.skipped_rows, 0);
    }

    #[test]
    fn test_csv_capitalized_and_contact_columns() {
        let data = "Name,Contact\nCarol,+44 7700 900123\n";
        let result = recipients_from_csv(data.as_bytes()).unwrap();
        assert_eq!(ids(&result.recipients), vec!["447700900123"]);
    }

    #[test]
    fn test_csv_column_names_are_case_sensitive() {
        let data = "name,pHoNe\nDave,123\n";
        let result = recipients_from_csv(data.as_bytes()).unwrap();

        assert!(result.recipients.is_empty());
        assert_eq!(result.skipped_rows, 1);
    }

    #[test]
    fn test_csv_short_rows_are_skipped() {
        let data = "name,phone\nErin\nFrank,555\n";
        let result = recipients_from_csv(data.as_bytes()).unwrap();

        assert_eq!(ids(&result.recipients), vec!["555"]);
        assert_eq!(result.skipped_rows, 1);
    }

    #[test]
    fn test_csv_is_deterministic() {
        let data = "name,phone,number\nA,+1 1,9\nB,,+2 2\nC,,\n";
        let first = recipients_from_csv(data.as_bytes()).unwrap();
        let second = recipients_from_csv(data.as_bytes()).unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first.recipients), vec!["11", "22"]);
    }
}
