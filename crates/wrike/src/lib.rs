//! Cliente da API Wrike v4
//!
//! Este crate fornece uma interface tipada para a API do Wrike, com foco em
//! duas operações que vão além de um simples repasse HTTP:
//!
//! - **Hierarchy builder**: reconstrói parent / children / level de folders e
//!   projects a partir da lista plana com `childIds`
//! - **Audit log aggregator**: lê o audit log inteiro seguindo
//!   `nextPageToken`, com limite opcional de páginas e reframe (explode) do
//!   mapa `details`
//!
//! Além disso: tasks e attachments anotados com o nível da árvore, e
//! utilitários de flatten/unflatten para exportação tabular.
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use wrike::{WrikeClient, WrikeConfig};
//! use wrike::audit_log::{AggregateOptions, AuditLogAggregator};
//!
//! #[tokio::main]
//! async fn main() -> wrike::Result<()> {
//!     // IMPORTANTE: ler de variáveis de ambiente (NUNCA hardcode!)
//!     let token = std::env::var("WRIKE_API_TOKEN").unwrap_or_default();
//!     let client = WrikeClient::from_config(&WrikeConfig::new(token))?;
//!
//!     let aggregator = AuditLogAggregator::new(client);
//!     let result = aggregator.aggregate(&AggregateOptions::default()).await;
//!     println!("{} entradas ({:?})", result.entries.len(), result.stop);
//!
//!     Ok(())
//! }
//! ```

// Módulos públicos
pub mod attachments;
pub mod audit_log;
pub mod client;
pub mod config;
pub mod error;
pub mod folders;
pub mod hierarchy;
pub mod tabular;
pub mod tasks;
pub mod types;

// Re-exports principais
pub use client::WrikeClient;
pub use config::WrikeConfig;
pub use error::{FetchError, Result, WrikeError};
