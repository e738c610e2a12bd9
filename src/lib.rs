//! Evaluation and storage-encoding core of a native XML query engine.
//!
//! The work is split across three crates, re-exported here:
//!
//! - [`codec`]: variable-byte integers and fixed-width fields with in-place
//!   backpatching
//! - [`dom`]: level-ordered node addressing, node sets, document sets and
//!   their storage encoding
//! - [`xquery`]: predicate evaluation and arithmetic operator resolution
//!
//! # Example
//!
//! ```ignore
//! use xstore::dom::{DocumentId, DocumentRegistry, DocumentSet, LevelTable, NodeRef, NodeSet};
//! use xstore::xquery::{EvalContext, Literal, Predicate};
//!
//! xstore::init_logging();
//! let config = xstore::load_config("evaluator.json")?;
//!
//! let doc = DocumentId::new(1);
//! let mut registry = DocumentRegistry::new();
//! registry.insert_document(doc, LevelTable::from_orders(&[1, 3])?);
//!
//! let context: NodeSet = (2..5).map(|gid| NodeRef::new(doc, gid)).collect();
//! let ctx = EvalContext::new(&registry, &config);
//! let second = Predicate::new(Box::new(Literal::new(2i64)))
//!     .evaluate(&ctx, &DocumentSet::singleton(doc), &context)?;
//! ```

pub use xstore_codec as codec;
pub use xstore_dom as dom;
pub use xstore_xquery as xquery;

use std::path::Path;
use thiserror::Error;
use xstore_xquery::EvaluatorConfig;

#[derive(Error, Debug)]
pub enum XstoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid evaluator configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] xstore_dom::DomError),

    #[error(transparent)]
    Query(#[from] xstore_xquery::XQueryError),
}

/// Installs `env_logger` as the global logger, filtered by `RUST_LOG` and
/// defaulting to `warn`. Calling it again has no effect.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Reads an [`EvaluatorConfig`] from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<EvaluatorConfig, XstoreError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let config = EvaluatorConfig::from_json(&json)?;
    log::debug!("Loaded evaluator configuration from {}: {:?}", path.display(), config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "memoize_sibling_groups": false }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.memoize_sibling_groups);
        assert!(config.log_timings);
    }

    #[test]
    fn test_load_config_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "memoize_sibling_groups = false").unwrap();
        assert!(matches!(load_config(file.path()), Err(XstoreError::Config(_))));

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_config(missing), Err(XstoreError::Io(_))));
    }
}
