//! Folders e projects do Wrike
//!
//! Na API v4 um project é um folder com o bloco adicional `project`
//! (owners, datas, status). Os dois compartilham o endpoint `/folders`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WrikeError};

/// Um folder ou project, como devolvido por `GET /spaces/{id}/folders`
///
/// Os campos derivados (`parent`, `children`, `level`) são preenchidos pelo
/// módulo `hierarchy` a cada chamada; nunca vêm da API nem são cacheados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    // ==================== IDENTIFICAÇÃO ====================
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Referências aos filhos, na ordem da API (descartado após `build_child_links`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<String>,

    /// Bloco específico de projects (ausente em folders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Value>,

    // ==================== HIERARQUIA (derivada) ====================
    /// `{parent_id: parent_title}`; vazio para raízes
    #[serde(default)]
    pub parent: IndexMap<String, String>,

    /// Todos os pais que referenciaram este nó, em ordem de encontro
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub referenced_by: IndexMap<String, String>,

    /// `{child_id: child_title}`; título vazio quando o filho não está no conjunto
    #[serde(default)]
    pub children: IndexMap<String, String>,

    /// Profundidade a partir da raiz (0); `None` se inalcançável
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    // ==================== OUTROS ====================
    /// Demais campos da API (accountId, scope, permalink, customFields...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FolderNode {
    /// Cria um nó mínimo (id, título e filhos)
    pub fn new(id: impl Into<String>, title: impl Into<String>, child_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            child_ids,
            project: None,
            parent: IndexMap::new(),
            referenced_by: IndexMap::new(),
            children: IndexMap::new(),
            level: None,
            extra: Map::new(),
        }
    }

    /// `true` se o nó carrega o bloco `project`
    pub fn is_project(&self) -> bool {
        self.project.is_some()
    }

    pub fn kind(&self) -> FolderKind {
        if self.is_project() {
            FolderKind::Project
        } else {
            FolderKind::Folder
        }
    }

    /// `true` se nenhum outro nó referencia este como filho
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Tipo do nó na árvore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    Folder,
    Project,
}

impl FolderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderKind::Folder => "folder",
            FolderKind::Project => "project",
        }
    }
}

/// Filtro `?project=` do endpoint de folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderScope {
    /// Folders e projects
    #[default]
    All,
    /// `?project=false`
    FoldersOnly,
    /// `?project=true`
    ProjectsOnly,
}

impl FolderScope {
    /// Sufixo de query string para o endpoint de folders
    pub fn query_suffix(&self) -> &'static str {
        match self {
            FolderScope::All => "",
            FolderScope::FoldersOnly => "?project=false",
            FolderScope::ProjectsOnly => "?project=true",
        }
    }
}

/// Seletor para buscas por nome ou por id
///
/// O valor é um título em `find_id_by_title` e um id em `find_title_by_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelector {
    Folder(String),
    Project(String),
}

impl FolderSelector {
    /// Monta o seletor a partir de dois opcionais mutuamente exclusivos
    ///
    /// Folder tem precedência quando ambos vêm preenchidos. Nenhum dos dois é
    /// erro de programação (`MissingSelector`).
    pub fn from_parts(folder: Option<String>, project: Option<String>) -> Result<Self> {
        match (folder, project) {
            (Some(folder), _) => Ok(FolderSelector::Folder(folder)),
            (None, Some(project)) => Ok(FolderSelector::Project(project)),
            (None, None) => Err(WrikeError::MissingSelector(
                "either a folder or a project must be provided".to_string(),
            )),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FolderSelector::Folder(v) | FolderSelector::Project(v) => v,
        }
    }

    pub fn scope(&self) -> FolderScope {
        match self {
            FolderSelector::Folder(_) => FolderScope::FoldersOnly,
            FolderSelector::Project(_) => FolderScope::ProjectsOnly,
        }
    }
}

/// Corpo de `POST /folders/{parent_id}/folders`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPayload {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shareds: Vec<String>,

    /// Pares `{"key": ..., "value": ...}`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Value>,

    /// Pares `{"id": ..., "value": ...}`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<Value>,

    /// Presente apenas ao criar um project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub user_access_roles: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_invitations: Option<bool>,
}

impl FolderPayload {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Corpo de `PUT /folders/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_parents: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_parents: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_shareds: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_shareds: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub user_access_roles: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_invitations: Option<bool>,
}
