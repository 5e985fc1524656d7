// ============================================================================
// Hierarchy Builder - árvore de folders/projects a partir de childIds
// ============================================================================
//
// A API devolve folders e projects de um space como lista plana, cada item
// com `childIds`. Este módulo reconstrói:
//
// 1. `parent`   → {parent_id: parent_title} (vazio nas raízes)
// 2. `children` → {child_id: child_title} (substitui `childIds`)
// 3. `level`    → profundidade a partir das raízes (0)
//
// Ids ausentes do conjunto viram título vazio; nada aqui falha por dado
// inconsistente, exceto ciclos em `childIds`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, WrikeError};
use crate::types::{FolderNode, Record};

/// Chaves padrão de `extract_projection`
pub const DEFAULT_PROJECTION_KEYS: &[&str] = &["id", "title", "level"];

/// Executa `build_parent_links`, `build_child_links` e `assign_levels` em ordem
pub fn build_hierarchy(nodes: &mut [FolderNode]) -> Result<()> {
    build_parent_links(nodes);
    build_child_links(nodes);
    assign_levels(nodes)?;

    tracing::debug!(
        "🌳 Hierarquia montada: {} nós, {} raízes",
        nodes.len(),
        nodes.iter().filter(|n| n.is_root()).count()
    );
    Ok(())
}

fn index_by_id(nodes: &[FolderNode]) -> HashMap<String, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.clone(), idx))
        .collect()
}

/// Preenche `parent` de cada nó referenciado em algum `child_ids`
///
/// Quando um nó é filho de mais de um pai, o último pai encontrado (ordem dos
/// registros, depois ordem de `child_ids`) fica em `parent`. Todos os pais
/// observados ficam em `referenced_by` e a sobrescrita é logada.
pub fn build_parent_links(nodes: &mut [FolderNode]) {
    for node in nodes.iter_mut() {
        node.parent.clear();
        node.referenced_by.clear();
    }

    let index = index_by_id(nodes);

    let links: Vec<(usize, String, String)> = nodes
        .iter()
        .flat_map(|parent| {
            let index = &index;
            parent.child_ids.iter().filter_map(move |child_id| {
                index
                    .get(child_id)
                    .map(|&child_idx| (child_idx, parent.id.clone(), parent.title.clone()))
            })
        })
        .collect();

    for (child_idx, parent_id, parent_title) in links {
        let child = &mut nodes[child_idx];

        if let Some((previous_id, _)) = child.parent.first() {
            if *previous_id != parent_id {
                tracing::warn!(
                    "⚠️ Nó {} referenciado por mais de um pai: {} substituído por {}",
                    child.id,
                    previous_id,
                    parent_id
                );
            }
        }

        child.parent.clear();
        child.parent.insert(parent_id.clone(), parent_title.clone());
        child.referenced_by.insert(parent_id, parent_title);
    }
}

/// Substitui `child_ids` pelo mapa `children` (id → título)
pub fn build_child_links(nodes: &mut [FolderNode]) {
    let id_to_title: HashMap<String, String> = nodes
        .iter()
        .map(|node| (node.id.clone(), node.title.clone()))
        .collect();

    for node in nodes.iter_mut() {
        let child_ids = std::mem::take(&mut node.child_ids);
        node.children = child_ids
            .into_iter()
            .map(|child_id| {
                let title = id_to_title.get(&child_id).cloned().unwrap_or_default();
                (child_id, title)
            })
            .collect();
    }
}

/// Atribui `level` percorrendo `children` a partir de cada raiz
///
/// Duas passadas com pilha explícita:
/// 1. todas as arestas `children`: um nó reencontrado no caminho corrente
///    gera `CycleDetected`
/// 2. apenas as arestas que `parent` confirma, então um nó com mais de um
///    pai recebe o nível do pai escolhido em `build_parent_links`
///
/// Nós inalcançáveis a partir de qualquer raiz ficam com `level = None`.
pub fn assign_levels(nodes: &mut [FolderNode]) -> Result<()> {
    let index = index_by_id(nodes);

    let child_indices: Vec<Vec<usize>> = nodes
        .iter()
        .map(|node| {
            node.children
                .keys()
                .filter_map(|child_id| index.get(child_id).copied())
                .collect()
        })
        .collect();

    for node in nodes.iter_mut() {
        node.level = None;
    }

    let roots: Vec<usize> = (0..nodes.len()).filter(|&idx| nodes[idx].is_root()).collect();

    check_cycles(nodes, &child_indices, &roots)?;

    for &root in &roots {
        nodes[root].level = Some(0);
        let mut stack: Vec<usize> = vec![root];

        while let Some(idx) = stack.pop() {
            let depth = nodes[idx].level.unwrap_or(0) + 1;
            for &child in &child_indices[idx] {
                let confirmed = nodes[child].parent.contains_key(&nodes[idx].id);
                if confirmed && nodes[child].level.is_none() {
                    nodes[child].level = Some(depth);
                    stack.push(child);
                }
            }
        }
    }

    let unreachable: Vec<&str> = nodes
        .iter()
        .filter(|n| n.level.is_none())
        .map(|n| n.id.as_str())
        .collect();
    if !unreachable.is_empty() {
        tracing::warn!(
            "⚠️ {} nó(s) sem caminho até uma raiz ficaram sem level: {:?}",
            unreachable.len(),
            unreachable
        );
    }

    Ok(())
}

/// DFS sobre todas as arestas `children` a partir das raízes
fn check_cycles(nodes: &[FolderNode], child_indices: &[Vec<usize>], roots: &[usize]) -> Result<()> {
    let mut on_path = vec![false; nodes.len()];

    for &root in roots {
        // (nó, posição do próximo filho)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        on_path[root] = true;

        while let Some(frame) = stack.last_mut() {
            let (idx, pos) = *frame;

            match child_indices[idx].get(pos) {
                Some(&child) => {
                    frame.1 += 1;
                    if on_path[child] {
                        return Err(WrikeError::CycleDetected {
                            id: nodes[child].id.clone(),
                        });
                    }
                    on_path[child] = true;
                    stack.push((child, 0));
                }
                None => {
                    on_path[idx] = false;
                    stack.pop();
                }
            }
        }
    }

    Ok(())
}

/// Mantém apenas as chaves pedidas que existem em cada registro
///
/// `base_keys = None` usa `["id", "title", "level"]`. Registros que não
/// serializam como objeto viram registros vazios.
pub fn extract_projection<T: Serialize>(
    records: &[T],
    base_keys: Option<&[&str]>,
    extra_keys: &[&str],
) -> Result<Vec<Record>> {
    let keys: Vec<&str> = base_keys
        .unwrap_or(DEFAULT_PROJECTION_KEYS)
        .iter()
        .chain(extra_keys.iter())
        .copied()
        .collect();

    records
        .iter()
        .map(|record| {
            let value = serde_json::to_value(record)?;
            let mut projected = Record::new();
            if let Value::Object(map) = value {
                for key in &keys {
                    if let Some(v) = map.get(*key) {
                        projected.insert((*key).to_string(), v.clone());
                    }
                }
            }
            Ok(projected)
        })
        .collect()
}

/// Mapa id → level para joins (nós sem level são omitidos)
pub fn id_to_level_map(nodes: &[FolderNode]) -> HashMap<String, u32> {
    nodes
        .iter()
        .filter_map(|node| node.level.map(|level| (node.id.clone(), level)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, title: &str, children: &[&str]) -> FolderNode {
        FolderNode::new(id, title, children.iter().map(|c| c.to_string()).collect())
    }

    fn find<'a>(nodes: &'a [FolderNode], id: &str) -> &'a FolderNode {
        nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn test_two_node_tree() {
        let mut nodes = vec![node("A", "", &["B"]), node("B", "", &[])];
        build_hierarchy(&mut nodes).unwrap();

        let a = find(&nodes, "A");
        assert_eq!(a.level, Some(0));
        assert!(a.parent.is_empty());
        assert_eq!(a.children.get("B"), Some(&String::new()));
        assert!(a.child_ids.is_empty());

        let b = find(&nodes, "B");
        assert_eq!(b.level, Some(1));
        assert_eq!(b.parent.get("A"), Some(&String::new()));
        assert!(b.children.is_empty());
    }

    #[test]
    fn test_levels_follow_parent_plus_one() {
        let mut nodes = vec![
            node("F4", "folder_d", &[]),
            node("F1", "folder_a", &["F2", "F3"]),
            node("F2", "folder_b", &["F4"]),
            node("F3", "folder_c", &[]),
            node("F5", "folder_e", &["F6"]),
            node("F6", "folder_f", &[]),
        ];
        build_hierarchy(&mut nodes).unwrap();

        for parent in &nodes {
            for child_id in parent.children.keys() {
                let child = find(&nodes, child_id);
                assert_eq!(child.level.unwrap(), parent.level.unwrap() + 1);
            }
        }
        assert_eq!(find(&nodes, "F4").level, Some(2));
        assert_eq!(find(&nodes, "F5").level, Some(0));
        assert_eq!(find(&nodes, "F4").parent.get("F2"), Some(&"folder_b".to_string()));
    }

    #[test]
    fn test_children_keep_order_and_unresolved_ids_get_empty_title() {
        let mut nodes = vec![node("A", "root", &["C", "MISSING", "B"]), node("B", "b", &[]), node("C", "c", &[])];
        build_child_links(&mut nodes);

        let children: Vec<(&str, &str)> = nodes[0]
            .children
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(children, vec![("C", "c"), ("MISSING", ""), ("B", "b")]);
    }

    #[test]
    fn test_every_referenced_existing_id_gets_a_parent() {
        let mut nodes = vec![
            node("A", "a", &["B", "GHOST"]),
            node("B", "b", &["C"]),
            node("C", "c", &[]),
            node("D", "d", &[]),
        ];
        build_parent_links(&mut nodes);

        assert!(!find(&nodes, "B").parent.is_empty());
        assert!(!find(&nodes, "C").parent.is_empty());
        assert!(find(&nodes, "A").parent.is_empty());
        assert!(find(&nodes, "D").parent.is_empty());
    }

    #[test]
    fn test_multiple_parents_last_writer_wins() {
        let mut nodes = vec![node("P1", "first", &["X"]), node("P2", "second", &["X"]), node("X", "x", &[])];
        build_parent_links(&mut nodes);

        let x = find(&nodes, "X");
        assert_eq!(x.parent.len(), 1);
        assert_eq!(x.parent.get("P2"), Some(&"second".to_string()));
        assert_eq!(x.referenced_by.keys().collect::<Vec<_>>(), vec!["P1", "P2"]);
    }

    #[test]
    fn test_multi_parent_level_matches_chosen_parent() {
        // A aparece sob B (nível 1) e sob R0 (nível 0); R0 vem depois e vence
        let mut nodes = vec![node("B", "b", &["A"]), node("R0", "r0", &["A", "B"]), node("A", "a", &[])];
        build_hierarchy(&mut nodes).unwrap();

        let a = find(&nodes, "A");
        assert_eq!(a.parent.keys().collect::<Vec<_>>(), vec!["R0"]);
        assert_eq!(a.referenced_by.keys().collect::<Vec<_>>(), vec!["B", "R0"]);
        assert_eq!(a.level, Some(1));
        assert_eq!(find(&nodes, "B").level, Some(1));

        for child in &nodes {
            if let Some((parent_id, _)) = child.parent.first() {
                let parent = find(&nodes, parent_id);
                assert_eq!(child.level.unwrap(), parent.level.unwrap() + 1);
            }
        }
    }

    #[test]
    fn test_multi_parent_deeper_parent_wins() {
        // X sob R (nível 0) e sob M (nível 1); M é o último a listar X
        let mut nodes = vec![node("R", "r", &["X", "M"]), node("M", "m", &["X"]), node("X", "x", &[])];
        build_hierarchy(&mut nodes).unwrap();

        let x = find(&nodes, "X");
        assert_eq!(x.parent.get("M"), Some(&"m".to_string()));
        assert_eq!(x.level, Some(2));
    }

    #[test]
    fn test_cycle_is_reported_instead_of_overflowing() {
        let mut nodes = vec![node("R", "root", &["A"]), node("A", "a", &["B"]), node("B", "b", &["A"])];
        let err = build_hierarchy(&mut nodes).unwrap_err();
        assert!(matches!(err, WrikeError::CycleDetected { .. }));
    }

    #[test]
    fn test_detached_cycle_leaves_nodes_without_level() {
        let mut nodes = vec![node("R", "root", &[]), node("A", "a", &["B"]), node("B", "b", &["A"])];
        build_hierarchy(&mut nodes).unwrap();

        assert_eq!(find(&nodes, "R").level, Some(0));
        assert_eq!(find(&nodes, "A").level, None);
        assert_eq!(find(&nodes, "B").level, None);

        let levels = id_to_level_map(&nodes);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels.get("R"), Some(&0));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let input = vec![node("A", "a", &["B"]), node("B", "b", &[]), node("C", "c", &["A"])];

        let mut first = input.clone();
        build_hierarchy(&mut first).unwrap();
        let mut second = input;
        build_hierarchy(&mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(find(&second, "B").level, Some(2));
    }

    #[test]
    fn test_child_titles_match_direct_lookup() {
        let original = vec![node("A", "alpha", &["B", "C"]), node("B", "beta", &["C"]), node("C", "gamma", &[])];
        let titles: HashMap<&str, &str> = original.iter().map(|n| (n.id.as_str(), n.title.as_str())).collect();

        let mut nodes = original.clone();
        build_hierarchy(&mut nodes).unwrap();
        let levels = id_to_level_map(&nodes);

        for (before, after) in original.iter().zip(nodes.iter()) {
            for child_id in &before.child_ids {
                assert_eq!(after.children[child_id], titles[child_id.as_str()]);
                assert!(levels.contains_key(child_id));
            }
        }
    }

    #[test]
    fn test_extract_projection_defaults_and_extra_keys() {
        let mut nodes = vec![node("A", "a", &["B"]), node("B", "b", &[])];
        nodes[0].extra.insert("permalink".to_string(), json!("https://www.wrike.com/open.htm?id=1"));
        build_hierarchy(&mut nodes).unwrap();

        let slim = extract_projection(&nodes, None, &["permalink", "doesNotExist"]).unwrap();
        assert_eq!(
            Value::Object(slim[0].clone()),
            json!({"id": "A", "title": "a", "level": 0, "permalink": "https://www.wrike.com/open.htm?id=1"})
        );
        assert_eq!(Value::Object(slim[1].clone()), json!({"id": "B", "title": "b", "level": 1}));

        let only_ids = extract_projection(&nodes, Some(&["id"][..]), &[]).unwrap();
        assert_eq!(Value::Object(only_ids[1].clone()), json!({"id": "B"}));
    }
}
