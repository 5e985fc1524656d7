//! Utilitários de JSON tabular
//!
//! Achatamento de registros aninhados em colunas (`customFields_0_id`) e a
//! operação inversa, usados na exportação para CSV/SQL.

use serde_json::{Map, Value};

use crate::types::Record;

/// Achata um registro juntando chaves aninhadas com `sep`
///
/// - objetos são achatados recursivamente (`project_ownerIds`)
/// - listas de objetos ganham o índice na chave (`customFields_0_value`)
/// - listas simples e listas vazias ficam intactas (`sharedIds`)
/// - chaves em `ignore_keys` (em qualquer nível) não são achatadas
///
/// ```
/// use serde_json::json;
/// use wrike::tabular::flatten_json;
///
/// let record = json!({"id": "A", "customFields": [{"id": "CF", "value": "foo"}]});
/// let flat = flatten_json(record.as_object().unwrap(), "_", &[]);
/// assert_eq!(flat["customFields_0_value"], json!("foo"));
/// ```
pub fn flatten_json(data: &Record, sep: &str, ignore_keys: &[&str]) -> Record {
    let mut flattened = Record::new();
    flatten_into(&mut flattened, data, "", sep, ignore_keys);
    flattened
}

fn flatten_into(out: &mut Record, data: &Record, parent_key: &str, sep: &str, ignore_keys: &[&str]) {
    for (key, value) in data {
        let new_key = if parent_key.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", parent_key, sep, key)
        };

        if ignore_keys.contains(&key.as_str()) {
            out.insert(new_key, value.clone());
            continue;
        }

        match value {
            Value::Object(inner) => flatten_into(out, inner, &new_key, sep, ignore_keys),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                for (idx, item) in items.iter().enumerate() {
                    if let Value::Object(inner) = item {
                        let indexed = format!("{}{}{}", new_key, sep, idx);
                        flatten_into(out, inner, &indexed, sep, ignore_keys);
                    }
                }
            }
            _ => {
                out.insert(new_key, value.clone());
            }
        }
    }
}

/// Desfaz `flatten_json`: segmentos numéricos reconstroem listas
///
/// O separador não pode aparecer dentro das chaves originais.
pub fn unflatten_json(flat: &Record, sep: &str) -> Value {
    let mut root = Value::Object(Map::new());
    for (key, value) in flat {
        let segments: Vec<&str> = key.split(sep).collect();
        insert_path(&mut root, &segments, value.clone());
    }
    root
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn slot<'a>(target: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match target {
        Value::Array(items) => {
            let idx: usize = segment.parse().ok()?;
            if items.len() <= idx {
                items.resize(idx + 1, Value::Null);
            }
            items.get_mut(idx)
        }
        Value::Object(map) => Some(map.entry(segment.to_string()).or_insert(Value::Null)),
        _ => None,
    }
}

fn insert_path(target: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    let Some(entry) = slot(target, head) else {
        tracing::debug!("Segmento '{}' conflita com um valor escalar; ignorado", head);
        return;
    };

    if rest.is_empty() {
        *entry = value;
        return;
    }

    if entry.is_null() {
        *entry = if is_index(rest[0]) {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }

    insert_path(entry, rest, value);
}

/// Valores de `id` no primeiro nível de cada registro
pub fn all_ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.get("id"))
        .filter_map(|id| id.as_str().map(str::to_string))
        .collect()
}

/// Sufixo ordinal em inglês (1st, 2nd, 3rd, 11th...)
pub fn ordinal_suffix(i: u64) -> &'static str {
    if (10..=13).contains(&(i % 100)) {
        return "th";
    }
    match i % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
