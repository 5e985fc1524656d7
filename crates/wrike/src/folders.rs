/// Folder Manager: folders e projects de um space do Wrike
///
/// Fluxo principal:
/// 1. **Fetch**: `GET /spaces/{space_id}/folders` (lista plana com `childIds`)
/// 2. **Hierarchy**: parent / children / level via `hierarchy::build_hierarchy`
///
/// As buscas por nome/id sempre partem de uma leitura nova; nada é cacheado.

use std::collections::HashMap;

use serde_json::Value;

use crate::client::WrikeClient;
use crate::error::{Result, WrikeError};
use crate::hierarchy;
use crate::types::{FolderNode, FolderPayload, FolderScope, FolderSelector, FolderUpdate, Record};

#[derive(Clone)]
pub struct FolderManager {
    client: WrikeClient,
}

impl FolderManager {
    pub fn new(client: WrikeClient) -> Self {
        Self { client }
    }

    /// Criar a partir de um token (conveniência)
    pub fn from_token(api_token: String) -> Result<Self> {
        let client = WrikeClient::new(api_token)?;
        Ok(Self::new(client))
    }

    /// Lista plana de folders/projects do space, sem hierarquia
    pub async fn fetch_nodes(&self, space_id: &str, scope: FolderScope) -> Result<Vec<FolderNode>> {
        let endpoint = format!("/spaces/{}/folders{}", space_id, scope.query_suffix());
        let nodes: Vec<FolderNode> = self.client.get_data(&endpoint).await?;

        tracing::info!("📁 {} folder(s)/project(s) no space {}", nodes.len(), space_id);
        Ok(nodes)
    }

    /// Folders/projects do space com `parent`, `children` e `level`
    pub async fn folder_tree(&self, space_id: &str, scope: FolderScope) -> Result<Vec<FolderNode>> {
        let mut nodes = self.fetch_nodes(space_id, scope).await?;
        hierarchy::build_hierarchy(&mut nodes)?;
        Ok(nodes)
    }

    /// Mapa id → level do space (todos os folders e projects)
    pub async fn level_map(&self, space_id: &str) -> Result<HashMap<String, u32>> {
        let nodes = self.folder_tree(space_id, FolderScope::All).await?;
        Ok(hierarchy::id_to_level_map(&nodes))
    }

    /// `{"id", "type": "folder"|"project"}` para cada nó, mais `extra_keys`
    pub async fn folder_kinds(&self, space_id: &str, extra_keys: &[&str]) -> Result<Vec<Record>> {
        let nodes = self.folder_tree(space_id, FolderScope::All).await?;
        let projected = hierarchy::extract_projection(&nodes, Some(&["id"][..]), extra_keys)?;

        Ok(nodes
            .iter()
            .zip(projected)
            .map(|(node, slim)| {
                let mut record = Record::new();
                record.insert("id".to_string(), Value::String(node.id.clone()));
                record.insert("type".to_string(), Value::String(node.kind().as_str().to_string()));
                for (key, value) in slim {
                    record.entry(key).or_insert(value);
                }
                record
            })
            .collect())
    }

    /// Id do primeiro folder/project com o título informado
    pub async fn find_id_by_title(&self, space_id: &str, selector: &FolderSelector) -> Result<Option<String>> {
        let nodes = self.fetch_nodes(space_id, selector.scope()).await?;
        let found = nodes
            .into_iter()
            .find(|node| node.title == selector.value())
            .map(|node| node.id);

        tracing::debug!("🔍 '{}' → {:?}", selector.value(), found);
        Ok(found)
    }

    /// Título do folder/project com o id informado
    pub async fn find_title_by_id(&self, space_id: &str, selector: &FolderSelector) -> Result<Option<String>> {
        let nodes = self.fetch_nodes(space_id, selector.scope()).await?;
        Ok(nodes
            .into_iter()
            .find(|node| node.id == selector.value())
            .map(|node| node.title))
    }

    /// Cria um folder (ou project, se `payload.project` vier preenchido)
    ///
    /// `parent_id` pode ser o id de um space para criar no nível 0.
    pub async fn create_folder(&self, parent_id: &str, payload: &FolderPayload) -> Result<FolderNode> {
        if payload.title.trim().is_empty() {
            return Err(WrikeError::ValidationError("title é obrigatório".to_string()));
        }

        let endpoint = format!("/folders/{}/folders", parent_id);
        let body = serde_json::to_value(payload)?;
        let created = first(self.client.post_data(&endpoint, &body).await?, parent_id)?;

        tracing::info!("✅ Folder criado: {} ({})", created.title, created.id);
        Ok(created)
    }

    /// Atualiza um folder/project
    pub async fn update_folder(&self, folder_id: &str, update: &FolderUpdate) -> Result<FolderNode> {
        let endpoint = format!("/folders/{}", folder_id);
        let body = serde_json::to_value(update)?;
        let updated = first(self.client.put_data(&endpoint, &body).await?, folder_id)?;

        tracing::info!("✏️ Folder atualizado: {} ({})", updated.title, updated.id);
        Ok(updated)
    }

    /// Move o folder/project (e descendentes) para a lixeira
    pub async fn delete_folder(&self, folder_id: &str) -> Result<FolderNode> {
        let endpoint = format!("/folders/{}", folder_id);
        let deleted = first(self.client.delete_data(&endpoint).await?, folder_id)?;

        tracing::info!("🗑️ Folder removido: {} ({})", deleted.title, deleted.id);
        Ok(deleted)
    }
}

fn first(nodes: Vec<FolderNode>, id: &str) -> Result<FolderNode> {
    nodes
        .into_iter()
        .next()
        .ok_or_else(|| WrikeError::NotFound(format!("folder {}", id)))
}
