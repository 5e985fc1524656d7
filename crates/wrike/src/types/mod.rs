//! Tipos da API Wrike
//!
//! Registros com estrutura estável (folders/projects, audit log) são tipados;
//! tasks e attachments trafegam como `Record` porque o Wrike devolve dezenas
//! de campos opcionais que só interessam à exportação tabular.

pub mod audit;
pub mod folder;

pub use audit::{AuditEntry, AuditLogPage, AuditLogQuery, EventDateRange, ExplodedLogRow};
pub use folder::{FolderKind, FolderNode, FolderPayload, FolderScope, FolderSelector, FolderUpdate};

/// Registro JSON genérico (objeto com ordem de inserção preservada)
pub type Record = serde_json::Map<String, serde_json::Value>;
