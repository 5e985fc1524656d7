//! Tipos do audit log (`GET /audit_log`)
//!
//! Só pode ser lido por tokens de Enterprise Admins com o direito
//! "Create user activity reports"; caso contrário a API devolve 403.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Record;

/// Uma entrada do audit log
///
/// ```json
/// {
///   "id": "IEBCC46DA4E55",
///   "operation": "TaskCreated",
///   "userId": "UDWKFOAG",
///   "userEmail": "matthew@nicejacket.cc",
///   "eventDate": "2023-10-17T22:55:51Z",
///   "ipAddress": "44.255.128.242",
///   "objectType": "Task",
///   "objectName": "Order released",
///   "objectId": "IEBCC46DA4E55",
///   "details": {"Work Item Type": "Task"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,

    /// Tipo do evento (TaskCreated, TaskStatusChanged, InvitationSend...)
    pub operation: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub user_email: Option<String>,

    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub object_type: Option<String>,

    #[serde(default)]
    pub object_name: Option<String>,

    #[serde(default)]
    pub object_id: Option<String>,

    /// Normalmente um mapa rótulo → descrição; mantido como `Value` porque
    /// a API nem sempre entrega um objeto
    #[serde(default)]
    pub details: Value,
}

impl AuditEntry {
    /// Converte a entrada em um registro plano com as chaves da API
    ///
    /// `details_key` define o nome da coluna que recebe `details`.
    pub fn to_record(&self, details_key: &str) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(self.id));
        record.insert("operation".to_string(), json!(self.operation));
        record.insert("userId".to_string(), json!(self.user_id));
        record.insert("userEmail".to_string(), json!(self.user_email));
        record.insert(
            "eventDate".to_string(),
            json!(self
                .event_date
                .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))),
        );
        record.insert("ipAddress".to_string(), json!(self.ip_address));
        record.insert("objectType".to_string(), json!(self.object_type));
        record.insert("objectName".to_string(), json!(self.object_name));
        record.insert("objectId".to_string(), json!(self.object_id));
        record.insert(details_key.to_string(), self.details.clone());
        record
    }
}

/// Uma página do audit log
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    #[serde(default, rename = "data")]
    pub entries: Vec<AuditEntry>,

    /// Ausente (ou vazio) na última página
    #[serde(default, deserialize_with = "deserialize_token")]
    pub next_page_token: Option<String>,
}

fn deserialize_token<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(token.filter(|t| !t.is_empty()))
}

/// Intervalo de datas do filtro `eventDate`
///
/// Tratado como semiaberto: `start` inclusivo, `end` exclusivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl EventDateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `start <= ts < end`, ignorando limites ausentes
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts < e)
    }

    /// Valor JSON do parâmetro `eventDate` (ex: `{"start":"2023-02-01T07:51:44Z"}`)
    pub fn to_query_value(&self) -> String {
        let mut obj = Record::new();
        if let Some(start) = self.start {
            obj.insert("start".to_string(), json!(format_timestamp(start)));
        }
        if let Some(end) = self.end {
            obj.insert("end".to_string(), json!(format_timestamp(end)));
        }
        Value::Object(obj).to_string()
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Filtros de uma leitura do audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    pub event_date: Option<EventDateRange>,
    /// Vazio = todas as operações
    pub operations: Vec<String>,
    pub page_size: u32,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            event_date: None,
            operations: Vec::new(),
            page_size: 100,
        }
    }
}

impl AuditLogQuery {
    /// Monta o endpoint de uma página
    ///
    /// Com token, apenas `pageSize` e `nextPageToken` são enviados: o token já
    /// carrega os filtros da primeira requisição.
    pub fn endpoint(&self, next_page_token: Option<&str>) -> String {
        let mut params = vec![format!("pageSize={}", self.page_size)];

        if let Some(token) = next_page_token {
            params.push(format!("nextPageToken={}", urlencoding::encode(token)));
        } else {
            if let Some(range) = self.event_date.filter(|r| !r.is_empty()) {
                params.push(format!("eventDate={}", urlencoding::encode(&range.to_query_value())));
            }
            if !self.operations.is_empty() {
                let ops = Value::from(self.operations.clone()).to_string();
                params.push(format!("operations={}", urlencoding::encode(&ops)));
            }
        }

        format!("/audit_log?{}", params.join("&"))
    }
}

/// Linha do reframe: colunas da entrada + `event` + `description`
pub type ExplodedLogRow = Record;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 7, 51, 44).unwrap()
    }

    #[test]
    fn test_page_deserialization_treats_empty_token_as_last_page() {
        let raw = json!({
            "kind": "auditLog",
            "nextPageToken": "",
            "responseSize": 1,
            "data": [{
                "id": "IEBCC46DA4E55",
                "operation": "TaskCreated",
                "eventDate": "2023-10-17T22:55:51Z",
                "details": {"Work Item Type": "Task"}
            }]
        });

        let page: AuditLogPage = serde_json::from_value(raw).unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.next_page_token, None);
        assert_eq!(page.entries[0].user_id, None);
    }

    #[test]
    fn test_event_date_range_is_half_open() {
        let range = EventDateRange::new(Some(ts(2023, 2, 1)), Some(ts(2023, 2, 28)));
        assert!(range.contains(ts(2023, 2, 1)));
        assert!(range.contains(ts(2023, 2, 15)));
        assert!(!range.contains(ts(2023, 2, 28)));
        assert!(!range.contains(ts(2023, 1, 31)));
        assert_eq!(
            range.to_query_value(),
            r#"{"start":"2023-02-01T07:51:44Z","end":"2023-02-28T07:51:44Z"}"#
        );
    }

    #[test]
    fn test_endpoint_sends_filters_only_on_first_page() {
        let query = AuditLogQuery {
            event_date: Some(EventDateRange::new(Some(ts(2023, 2, 1)), None)),
            operations: vec!["TaskCreated".to_string()],
            page_size: 2,
        };

        let first = query.endpoint(None);
        assert!(first.starts_with("/audit_log?pageSize=2&eventDate="));
        assert!(first.contains("operations=%5B%22TaskCreated%22%5D"));

        let next = query.endpoint(Some("AACTACY3YYQAAAXEM3ZC"));
        assert_eq!(next, "/audit_log?pageSize=2&nextPageToken=AACTACY3YYQAAAXEM3ZC");
    }

    #[test]
    fn test_to_record_keeps_api_column_names() {
        let entry = AuditEntry {
            id: "E1".to_string(),
            operation: "TaskStatusChanged".to_string(),
            user_id: Some("FJDSKSA".to_string()),
            user_email: None,
            event_date: Some(ts(2023, 2, 1)),
            ip_address: None,
            object_type: Some("Task".to_string()),
            object_name: None,
            object_id: None,
            details: json!({"Prev Status": "Order Pending"}),
        };

        let record = entry.to_record("details");
        let keys: Vec<&str> = record.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "id", "operation", "userId", "userEmail", "eventDate", "ipAddress",
                "objectType", "objectName", "objectId", "details"
            ]
        );
        assert_eq!(record["eventDate"], json!("2023-02-01T07:51:44Z"));
    }
}
