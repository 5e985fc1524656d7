// ============================================================================
// Task Manager - tasks do Wrike anotadas com o nível da hierarquia
// ============================================================================
//
// Níveis de tasks (um a mais que o folder que as contém, para diferenciar
// tasks soltas no space de tasks no folder de nível 0):
//
//   /space
//       task                      0
//       ../folder (0)
//           task                  1
//       ../folder (0)
//           ../folder (1)
//               task              2

use std::collections::HashMap;

use serde_json::Value;

use crate::client::WrikeClient;
use crate::error::Result;
use crate::folders::FolderManager;
use crate::hierarchy;
use crate::types::{FolderScope, Record};

/// Como o nível de um lote de tasks é definido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLevel<'a> {
    /// Nível fixo (tasks no nível do space usam 0)
    Fixed(u32),
    /// Nível do folder + 1; folder fora do mapa conta como 0
    InFolder(&'a str),
}

/// Preenche `level` em cada task
pub fn add_level_to_tasks(tasks: &mut [Record], placement: TaskLevel<'_>, folder_levels: &HashMap<String, u32>) {
    let level = match placement {
        TaskLevel::Fixed(level) => level,
        TaskLevel::InFolder(folder_id) => folder_levels.get(folder_id).copied().unwrap_or(0) + 1,
    };

    for task in tasks.iter_mut() {
        task.insert("level".to_string(), Value::from(level));
    }
}

#[derive(Clone)]
pub struct TaskManager {
    client: WrikeClient,
}

impl TaskManager {
    pub fn new(client: WrikeClient) -> Self {
        Self { client }
    }

    /// `GET /folders/{id}/tasks`
    pub async fn tasks_in_folder(&self, folder_id: &str) -> Result<Vec<Record>> {
        self.client.get_data(&format!("/folders/{}/tasks", folder_id)).await
    }

    /// `GET /tasks` (todas as tasks da conta)
    pub async fn tasks_in_account(&self) -> Result<Vec<Record>> {
        self.client.get_data("/tasks").await
    }

    /// Todas as tasks de um space, com `level`
    ///
    /// Tasks do endpoint do space recebem nível 0; em seguida cada folder é
    /// lido e suas tasks recebem `level(folder) + 1`. `slim` reduz cada task a
    /// `id`, `title` e `level`.
    pub async fn tasks_in_space(&self, space_id: &str, slim: bool) -> Result<Vec<Record>> {
        let empty = HashMap::new();
        let mut all_tasks: Vec<Record> = Vec::new();

        let mut space_tasks: Vec<Record> = self.client.get_data(&format!("/spaces/{}/tasks", space_id)).await?;
        add_level_to_tasks(&mut space_tasks, TaskLevel::Fixed(0), &empty);
        all_tasks.extend(space_tasks);

        let folders = FolderManager::new(self.client.clone());
        let nodes = folders.folder_tree(space_id, FolderScope::FoldersOnly).await?;
        let levels = hierarchy::id_to_level_map(&nodes);

        for node in &nodes {
            let mut folder_tasks = self.tasks_in_folder(&node.id).await?;
            if folder_tasks.is_empty() {
                continue;
            }
            add_level_to_tasks(&mut folder_tasks, TaskLevel::InFolder(&node.id), &levels);
            all_tasks.extend(folder_tasks);
        }

        tracing::info!("📋 {} task(s) no space {}", all_tasks.len(), space_id);

        if slim {
            return hierarchy::extract_projection(&all_tasks, None, &[]);
        }
        Ok(all_tasks)
    }
}
