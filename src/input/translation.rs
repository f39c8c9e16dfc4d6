//! Translation file input definitions

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use serde_json::Value;
use thiserror::Error;

/// Failure to load a locale's translation file.
///
/// Always fatal for a build: a site is never generated from partial data.
#[derive(Error, Debug)]
pub enum TranslationLoadError {
    /// File missing or unreadable
    #[error("Failed to read translation file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("Failed to parse translation file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Top-level value is not an object
    #[error("Translation file {} must contain a JSON object at the top level", path.display())]
    NotAnObject { path: PathBuf },
}

/// One locale's translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    /// Locale code the table belongs to
    locale: String,

    /// Source file, empty for tables built in memory.
    file_path: PathBuf,

    /// Flattened translation key map (e.g., "nav.home" -> "Home").
    keys: HashMap<String, String>,
}

impl TranslationTable {
    #[must_use]
    pub fn new(
        locale: impl Into<String>,
        file_path: impl Into<PathBuf>,
        keys: HashMap<String, String>,
    ) -> Self {
        Self { locale: locale.into(), file_path: file_path.into(), keys }
    }

    /// Table with no keys, for a locale whose copy is entirely provided by fallback.
    #[must_use]
    pub fn empty(locale: impl Into<String>) -> Self {
        Self::new(locale, PathBuf::new(), HashMap::new())
    }

    /// Parses JSON text into a table.
    ///
    /// # Errors
    /// - Malformed JSON
    /// - Top-level value is not an object
    pub fn from_json_str(
        locale: impl Into<String>,
        file_path: impl Into<PathBuf>,
        json_text: &str,
        separator: &str,
    ) -> Result<Self, TranslationLoadError> {
        let file_path = file_path.into();

        let json: Value = serde_json::from_str(json_text)
            .map_err(|source| TranslationLoadError::Parse { path: file_path.clone(), source })?;

        if !json.is_object() {
            return Err(TranslationLoadError::NotAnObject { path: file_path });
        }

        let keys = flatten_json(&json, separator, None);

        Ok(Self::new(locale, file_path, keys))
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    #[must_use]
    pub const fn keys(&self) -> &HashMap<String, String> {
        &self.keys
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Flatten nested JSON object into dot-separated key map.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use site_i18n::input::translation::flatten_json;
///
/// let json = json!({
///     "nav": {
///         "home": "Home",
///         "about": "About"
///     }
/// });
///
/// let flattened = flatten_json(&json, ".", None);
/// assert_eq!(flattened.get("nav.home"), Some(&"Home".to_string()));
/// assert_eq!(flattened.get("nav.about"), Some(&"About".to_string()));
/// ```
#[must_use]
pub fn flatten_json(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
) -> HashMap<String, String> {
    let mut result = HashMap::new();
    flatten_json_value(json, separator, prefix, &mut result);
    result
}

/// Recursive worker for [`flatten_json`].
fn flatten_json_value(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
    result: &mut HashMap<String, String>,
) {
    match json {
        Value::Object(map) => {
            for (key, value) in map {
                let full_key =
                    prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::Array(arr) => {
            for (index, value) in arr.iter().enumerate() {
                let full_key =
                    prefix.map_or_else(|| format!("[{index}]"), |p| format!("{p}[{index}]"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::String(s) => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), s.clone());
            }
        }
        _ => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), json.to_string());
            }
        }
    }
}

/// Reads a locale's translation file.
///
/// # Errors
/// - File missing or unreadable
/// - Malformed JSON, or a top-level value that is not an object
pub fn load_translation_file(
    locale: &str,
    file_path: &Path,
    separator: &str,
) -> Result<TranslationTable, TranslationLoadError> {
    tracing::debug!(locale, path = %file_path.display(), "Loading translation file");

    let content = std::fs::read_to_string(file_path)
        .map_err(|source| TranslationLoadError::Io { path: file_path.to_path_buf(), source })?;

    let table = TranslationTable::from_json_str(locale, file_path, &content, separator)?;
    tracing::debug!(locale, keys = table.len(), "Loaded translation file");

    Ok(table)
}
