//! Attachments de folders, projects e tasks
//!
//! `attachments_in_space` percorre a árvore do space: primeiro os anexos de
//! cada folder/project, depois os anexos de cada task de cada folder, marcando
//! estes com o tipo (`in_type`) e o título (`in_type_title`) do contêiner.

use serde_json::Value;

use crate::client::WrikeClient;
use crate::error::Result;
use crate::folders::FolderManager;
use crate::hierarchy;
use crate::tabular::all_ids;
use crate::tasks::TaskManager;
use crate::types::Record;

/// Dono de um conjunto de anexos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentTarget<'a> {
    Folder(&'a str),
    Task(&'a str),
}

impl AttachmentTarget<'_> {
    fn endpoint(&self) -> String {
        match self {
            AttachmentTarget::Folder(id) => format!("/folders/{}/attachments", id),
            AttachmentTarget::Task(id) => format!("/tasks/{}/attachments", id),
        }
    }
}

#[derive(Clone)]
pub struct AttachmentManager {
    client: WrikeClient,
}

impl AttachmentManager {
    pub fn new(client: WrikeClient) -> Self {
        Self { client }
    }

    pub async fn attachments_for(&self, target: AttachmentTarget<'_>) -> Result<Vec<Record>> {
        self.client.get_data(&target.endpoint()).await
    }

    /// Todos os anexos do space
    ///
    /// `slim` reduz cada anexo a `id`, `title`, `level`, `name`, `in_type` e
    /// `in_type_title` (quando presentes).
    pub async fn attachments_in_space(&self, space_id: &str, slim: bool) -> Result<Vec<Record>> {
        let folders = FolderManager::new(self.client.clone());
        let tasks = TaskManager::new(self.client.clone());

        let containers = folders.folder_kinds(space_id, &["title", "level"]).await?;
        let mut attachments: Vec<Record> = Vec::new();

        for container in &containers {
            let Some(folder_id) = container.get("id").and_then(Value::as_str) else {
                continue;
            };
            attachments.extend(self.attachments_for(AttachmentTarget::Folder(folder_id)).await?);
        }

        for container in &containers {
            let Some(folder_id) = container.get("id").and_then(Value::as_str) else {
                continue;
            };
            let in_type = container.get("type").cloned().unwrap_or(Value::Null);
            let in_type_title = container.get("title").cloned().unwrap_or(Value::Null);

            let folder_tasks = tasks.tasks_in_folder(folder_id).await?;
            for task_id in all_ids(&folder_tasks) {
                let mut task_attachments = self.attachments_for(AttachmentTarget::Task(&task_id)).await?;
                for attachment in task_attachments.iter_mut() {
                    attachment.insert("in_type".to_string(), in_type.clone());
                    attachment.insert("in_type_title".to_string(), in_type_title.clone());
                }
                attachments.extend(task_attachments);
            }
        }

        tracing::info!("📎 {} anexo(s) no space {}", attachments.len(), space_id);

        if slim {
            return hierarchy::extract_projection(&attachments, None, &["name", "in_type", "in_type_title"]);
        }
        Ok(attachments)
    }
}
