//! Seeding a new day from the master template.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use thiserror::Error;

use crate::outline::{self, Document, IdSource, Item, mutate};
use crate::store::{DocumentStore, StoreError};

pub const TEMPLATE_FILE: &str = "template.json";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed template {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Template used when the data directory has none.
pub fn builtin() -> Document {
    Document::from_items(vec![
        Item::new("template-focus", "Focus", 0)
            .with_children(vec![Item::new("template-focus-1", "", 1)]),
        Item::new("template-notes", "Notes", 0)
            .with_children(vec![Item::new("template-notes-1", "", 1)]),
        Item::new("template-done", "Done", 0),
    ])
}

/// Reads `<dir>/template.json`, falling back to [`builtin`] when it is absent.
pub fn load_template(dir: &Path) -> Result<Document, TemplateError> {
    let path = dir.join(TEMPLATE_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(builtin()),
        Err(source) => return Err(TemplateError::Io { path, source }),
    };
    serde_json::from_str(&content).map_err(|source| TemplateError::Format { path, source })
}

/// Deep copy of `template` in which every item carries a fresh id.
pub fn instantiate(template: &Document, ids: &mut dyn IdSource) -> Document {
    let items = template
        .items()
        .iter()
        .map(|item| mutate::clone_with_fresh_ids(item, ids))
        .collect();
    outline::ensure_initialized(Document::from_items(items), ids)
}

/// Loads `day`, or creates it from `template` when nothing is stored yet.
/// The flag tells whether the document was created.
pub fn open_day(
    store: &dyn DocumentStore,
    day: NaiveDate,
    template: &Document,
    ids: &mut dyn IdSource,
) -> Result<(Document, bool), StoreError> {
    match store.load(day)? {
        Some(document) => Ok((document, false)),
        None => {
            let document = instantiate(template, ids);
            info!(
                "event=day_created module=template status=ok day={} items={}",
                day,
                document.item_count()
            );
            Ok((document, true))
        }
    }
}
