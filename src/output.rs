//! Saída em JSON lines (um registro por linha)
//!
//! Com `flatten`, objetos aninhados viram colunas `a.b.c`, prontas para
//! carga tabular.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use wrike::tabular::flatten_json;

use crate::utils::AppError;

pub struct JsonLinesWriter<W: Write> {
    out: W,
    flatten_sep: Option<String>,
    written: usize,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            flatten_sep: None,
            written: 0,
        }
    }

    /// Ativa o flatten com o separador informado
    pub fn flattened(mut self, sep: impl Into<String>) -> Self {
        self.flatten_sep = Some(sep.into());
        self
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(record)?;
        let value = match (&self.flatten_sep, value) {
            (Some(sep), Value::Object(map)) => Value::Object(flatten_json(&map, sep, &[])),
            (_, other) => other,
        };

        serde_json::to_writer(&mut self.out, &value)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<T: Serialize>(&mut self, records: &[T]) -> Result<usize, AppError> {
        for record in records {
            self.write(record)?;
        }
        self.out.flush()?;
        Ok(records.len())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
