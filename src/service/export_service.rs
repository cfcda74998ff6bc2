use anyhow::Result;
use std::collections::BTreeSet;

pub const DEFAULT_PERIOD: &str = "3mo";
const KNOWN_PERIODS: &[&str] = &["1mo", "3mo", "6mo", "1y"];

/// Fetches the externally computed stock analysis and shapes it into a
/// downloadable spreadsheet. Indicator math lives in the analysis service,
/// never here.
#[derive(Clone)]
pub struct ExportService {
    pub analysis_base_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl ExportService {
    pub async fn export_csv(&self, period: &str) -> Result<String> {
        let url = format!("{}/analyze_stocks?period={}", self.analysis_base_url, period);
        let resp = self
            .client
            .get(url)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("analysis fetch failed with HTTP {}", resp.status().as_u16());
        }

        let rows: Vec<serde_json::Value> = resp.json().await?;
        Ok(to_csv(&rows))
    }
}

pub fn known_period(period: &str) -> bool {
    KNOWN_PERIODS.contains(&period)
}

/// Renders an array of flat JSON objects as CSV. The header is the union of
/// keys across rows, sorted for a stable column order.
pub fn to_csv(rows: &[serde_json::Value]) -> String {
    let mut columns: BTreeSet<String> = BTreeSet::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                columns.insert(key.clone());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| escape_field(c)).collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for row in rows {
        let obj = match row.as_object() {
            Some(obj) => obj,
            None => continue,
        };
        let line: Vec<String> = columns
            .iter()
            .map(|c| escape_field(&cell_text(obj.get(c))))
            .collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }

    out
}

fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{known_period, to_csv};
    use serde_json::json;

    #[test]
    fn header_is_union_of_keys() {
        let rows = vec![
            json!({"symbol": "TCS", "rsi": 61.2}),
            json!({"symbol": "INFY", "macd": "bullish"}),
        ];
        let csv = to_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("macd,rsi,symbol"));
        assert_eq!(lines.next(), Some(",61.2,TCS"));
        assert_eq!(lines.next(), Some("bullish,,INFY"));
    }

    #[test]
    fn fields_with_commas_and_quotes_are_escaped() {
        let rows = vec![json!({"note": "watch, closely", "name": "say \"buy\""})];
        let csv = to_csv(&rows);
        assert!(csv.contains("\"watch, closely\""));
        assert!(csv.contains("\"say \"\"buy\"\"\""));
    }

    #[test]
    fn empty_input_yields_header_only() {
        assert_eq!(to_csv(&[]), "\r\n");
    }

    #[test]
    fn period_allowlist() {
        assert!(known_period("3mo"));
        assert!(!known_period("99y"));
    }
}
