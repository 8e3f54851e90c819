//! Message catalog loading.
//!
//! The built-in `en_us` catalog always applies; a `lang/<lang>.yaml` file in
//! the data directory overlays it when present. A broken or missing language
//! file falls back to the built-ins with a warning.

use std::collections::HashMap;
use std::path::Path;

use downcount_core::Catalog;
use tracing::{debug, warn};

/// Loads the catalog for a language from the data directory.
pub fn load_catalog(data_dir: &Path, lang: &str) -> Catalog {
    let catalog = Catalog::builtin_en_us();

    let path = data_dir.join("lang").join(format!("{lang}.yaml"));
    if !path.exists() {
        if lang != "en_us" {
            warn!(lang = %lang, path = %path.display(), "Language file not found, falling back to en_us");
        }
        return catalog;
    }

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read language file");
            return catalog;
        }
    };

    match serde_yaml::from_str::<HashMap<String, String>>(&source) {
        Ok(messages) => {
            debug!(lang = %lang, messages = messages.len(), "Loaded language file");
            catalog.merged_with(Catalog::from_messages(messages))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse language file");
            catalog
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog(dir.path(), "xx_yy");
        assert_eq!(catalog.get("downcount.prefix"), Some("[downcount] "));
    }

    #[test]
    fn test_language_file_overlays_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lang")).unwrap();
        std::fs::write(
            dir.path().join("lang/de_de.yaml"),
            "downcount.prefix: \"[runterzählen] \"\n",
        )
        .unwrap();

        let catalog = load_catalog(dir.path(), "de_de");
        assert_eq!(catalog.get("downcount.prefix"), Some("[runterzählen] "));
        // untouched keys keep the built-in text
        assert!(catalog.get("downcount.command.reload").is_some());
    }

    #[test]
    fn test_broken_language_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lang")).unwrap();
        std::fs::write(dir.path().join("lang/fr_fr.yaml"), "not: [valid\n").unwrap();

        let catalog = load_catalog(dir.path(), "fr_fr");
        assert_eq!(catalog.get("downcount.prefix"), Some("[downcount] "));
    }
}
