// ============================================================================
// Audit Log - leitura paginada completa do audit log do Wrike
// ============================================================================
//
// O endpoint `/audit_log` é paginado por `nextPageToken`. A agregação:
//
//   Fetching ──ok──▶ Accumulating ──token──▶ Fetching
//      │                  │
//      │                  └──sem token / limite de páginas──▶ Done
//      └──erro (401/403/400/outros)──▶ Error
//
// Cada página depende do token da anterior, então a leitura é sequencial.
// Não há retry: qualquer falha encerra a agregação mantendo o prefixo já lido.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::client::WrikeClient;
use crate::error::FetchError;
use crate::tabular::ordinal_suffix;
use crate::types::{AuditEntry, AuditLogPage, AuditLogQuery, EventDateRange, ExplodedLogRow, Record};

/// Fonte de páginas do audit log
///
/// Implementada pelo `WrikeClient`; nos testes, por fontes em memória.
#[async_trait]
pub trait AuditPageSource: Send + Sync {
    /// Lê uma página. `next_page_token = None` pede a primeira página com os
    /// filtros de `query`.
    async fn fetch_page(
        &self,
        next_page_token: Option<&str>,
        query: &AuditLogQuery,
    ) -> std::result::Result<AuditLogPage, FetchError>;
}

#[async_trait]
impl AuditPageSource for WrikeClient {
    async fn fetch_page(
        &self,
        next_page_token: Option<&str>,
        query: &AuditLogQuery,
    ) -> std::result::Result<AuditLogPage, FetchError> {
        let endpoint = query.endpoint(next_page_token);

        match self.get_json::<AuditLogPage>(&endpoint).await {
            Ok(page) => Ok(page),
            Err(e) => {
                let err = FetchError::from(e);
                match &err {
                    FetchError::Unauthorized { status, .. } => {
                        tracing::error!("❌ Audit log: autenticação/permissão negada (status {})", status)
                    }
                    FetchError::BadRequest { message } => {
                        tracing::error!("❌ Audit log: requisição inválida: {}", message)
                    }
                    FetchError::Unexpected { status, message } => {
                        tracing::error!("❌ Audit log: falha inesperada ({:?}): {}", status, message)
                    }
                }
                Err(err)
            }
        }
    }
}

/// Nomes das colunas usadas pelo reframe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplodeColumns {
    /// Coluna com o mapa a explodir
    pub details: String,
    /// Nova coluna com a chave do mapa
    pub event: String,
    /// Nova coluna com o valor do mapa
    pub description: String,
}

impl Default for ExplodeColumns {
    fn default() -> Self {
        Self {
            details: "details".to_string(),
            event: "event".to_string(),
            description: "description".to_string(),
        }
    }
}

/// Explode a coluna `details` em uma linha por chave
///
/// As demais colunas são copiadas para cada linha gerada. Registros cujo
/// `details` não é um objeto não geram linhas.
pub fn explode(entries: &[Record], columns: &ExplodeColumns) -> Vec<ExplodedLogRow> {
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for entry in entries {
        let Some(Value::Object(details)) = entry.get(&columns.details) else {
            dropped += 1;
            continue;
        };

        for (event, description) in details {
            let mut row = Record::new();
            for (key, value) in entry {
                if *key != columns.details {
                    row.insert(key.clone(), value.clone());
                }
            }
            row.insert(columns.event.clone(), Value::String(event.clone()));
            row.insert(columns.description.clone(), description.clone());
            rows.push(row);
        }
    }

    if dropped > 0 {
        tracing::warn!(
            "⚠️ Reframe: {} registro(s) sem '{}' em formato de mapa foram descartados",
            dropped,
            columns.details
        );
    }

    rows
}

/// Atalho de `explode` para entradas tipadas
pub fn explode_entries(entries: &[AuditEntry], columns: &ExplodeColumns) -> Vec<ExplodedLogRow> {
    let records: Vec<Record> = entries.iter().map(|e| e.to_record(&columns.details)).collect();
    explode(&records, columns)
}

/// Opções de `AuditLogAggregator::aggregate`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub query: AuditLogQuery,
    /// Limite de páginas; `None` lê até o fim
    pub max_iterations: Option<u32>,
    /// Explode `details` ao final
    pub reframe: bool,
}

/// Motivo do encerramento da agregação
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A última página veio sem `nextPageToken`
    Exhausted,
    /// `max_iterations` atingido com páginas restantes (resultado é um prefixo)
    IterationCap,
    /// Falha terminal; o resultado contém as páginas lidas antes dela
    Failed(FetchError),
}

/// Resultado de uma agregação completa
#[derive(Debug, Clone)]
pub struct AuditLogResult {
    /// Entradas concatenadas na ordem de leitura
    pub entries: Vec<AuditEntry>,
    /// Linhas explodidas, quando `reframe` foi pedido
    pub exploded: Option<Vec<ExplodedLogRow>>,
    pub pages: u32,
    pub stop: StopReason,
    /// Apenas para observabilidade
    pub elapsed: Duration,
}

impl AuditLogResult {
    /// `true` apenas quando o feed foi lido até o fim
    pub fn is_complete(&self) -> bool {
        self.stop == StopReason::Exhausted
    }

    /// `true` se a leitura parou antes do fim (limite ou erro)
    pub fn stopped_early(&self) -> bool {
        !self.is_complete()
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.stop {
            StopReason::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Entradas fora do intervalo pedido são mantidas, apenas reportadas
fn warn_out_of_range(entries: &[AuditEntry], range: &EventDateRange) -> usize {
    let outside = entries
        .iter()
        .filter(|e| e.event_date.is_some_and(|ts| !range.contains(ts)))
        .count();

    if outside > 0 {
        tracing::warn!(
            "⚠️ {} entrada(s) com eventDate fora do intervalo pedido ({})",
            outside,
            range.to_query_value()
        );
    }
    outside
}

enum State {
    Fetching(Option<String>),
    Accumulating(AuditLogPage),
    Done(StopReason),
}

/// Agregador do audit log
///
/// Cada chamada de `aggregate` tem seu próprio acumulador; nada é
/// compartilhado entre chamadas.
pub struct AuditLogAggregator<S> {
    source: S,
}

impl<S: AuditPageSource> AuditLogAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Lê todas as páginas (ou até `max_iterations`) e concatena as entradas
    pub async fn aggregate(&self, options: &AggregateOptions) -> AuditLogResult {
        let started = Instant::now();
        let mut entries: Vec<AuditEntry> = Vec::new();
        let mut pages: u32 = 0;

        let mut state = match options.max_iterations {
            Some(0) => State::Done(StopReason::IterationCap),
            _ => State::Fetching(None),
        };

        let stop = loop {
            state = match state {
                State::Fetching(token) => {
                    match self.source.fetch_page(token.as_deref(), &options.query).await {
                        Ok(page) => State::Accumulating(page),
                        Err(err) => {
                            tracing::error!(
                                "❌ Erro ({}) na {}{} página do audit log; leitura interrompida",
                                err.class(),
                                pages + 1,
                                ordinal_suffix(u64::from(pages) + 1)
                            );
                            State::Done(StopReason::Failed(err))
                        }
                    }
                }
                State::Accumulating(page) => {
                    pages += 1;
                    tracing::info!(
                        "📋 {} entrada(s) na {}{} página do audit log",
                        page.entries.len(),
                        pages,
                        ordinal_suffix(u64::from(pages))
                    );
                    if let Some(range) = options.query.event_date {
                        warn_out_of_range(&page.entries, &range);
                    }
                    entries.extend(page.entries);

                    match page.next_page_token {
                        None => State::Done(StopReason::Exhausted),
                        Some(_) if options.max_iterations.is_some_and(|max| pages >= max) => {
                            tracing::info!(
                                "⏹️ Limite de {} página(s) atingido; resultado parcial",
                                pages
                            );
                            State::Done(StopReason::IterationCap)
                        }
                        Some(token) => State::Fetching(Some(token)),
                    }
                }
                State::Done(reason) => break reason,
            };
        };

        let exploded = options
            .reframe
            .then(|| explode_entries(&entries, &ExplodeColumns::default()));

        let elapsed = started.elapsed();
        tracing::info!(
            "✅ Audit log: {} entrada(s) em {} página(s), {:?} ({:.2}s)",
            entries.len(),
            pages,
            stop,
            elapsed.as_secs_f64()
        );

        AuditLogResult {
            entries,
            exploded,
            pages,
            stop,
            elapsed,
        }
    }
}
