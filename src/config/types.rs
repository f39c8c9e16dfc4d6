use std::collections::{
    BTreeMap,
    HashSet,
};
use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// One invalid setting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "locales[1].urlPrefix")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Failure to load or validate settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every problem found by `SiteSettings::validate`
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// Config file unreadable
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Config file is not valid JSON for `SiteSettings`
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered, one-per-line listing used in `ConfigError`'s message.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build-wide i18n settings read from `.site-i18n.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    /// Language advertised by the host build (e.g. `<html lang>`).
    /// Falls back to `default_locale` when unset.
    pub default_language: Option<String>,

    /// Locale used when nothing can be inferred from context.
    pub default_locale: String,

    /// Declared locales, in output order.
    pub locales: Vec<LocaleConfig>,

    /// Locale pattern (glob, `*` for any) to fallback locale code.
    pub fallback_locales: BTreeMap<String, String>,

    pub translations: TranslationFilesConfig,

    pub missing_translation: MissingTranslationPolicy,

    /// Static asset directories copied verbatim into the output.
    pub passthrough: Vec<PassthroughCopy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleConfig {
    pub code: String,
    pub url_prefix: String,
}

impl LocaleConfig {
    #[must_use]
    pub fn new(code: impl Into<String>, url_prefix: impl Into<String>) -> Self {
        Self { code: code.into(), url_prefix: url_prefix.into() }
    }
}

/// Placeholder substituted with the locale code in [`TranslationFilesConfig::path`].
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    /// Path of each locale's file relative to the site root; `{locale}` is replaced
    /// with the locale code (e.g. `src/{locale}/{locale}.json`).
    pub path: String,

    /// Separator used when flattening nested keys.
    pub key_separator: String,
}

impl TranslationFilesConfig {
    /// Translation file path for `code`, relative to the site root.
    #[must_use]
    pub fn path_for(&self, code: &str) -> PathBuf {
        PathBuf::from(self.path.replace(LOCALE_PLACEHOLDER, code))
    }
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { path: "src/{locale}/{locale}.json".to_string(), key_separator: ".".to_string() }
    }
}

/// What `render` does when a key is missing from both the locale and its fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingTranslationPolicy {
    /// Log a warning and emit the key itself so the gap is visible on the page.
    #[default]
    Placeholder,
    /// Fail the lookup.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassthroughCopy {
    pub from: PathBuf,
    pub to: PathBuf,
    /// Globs relative to `from`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl PassthroughCopy {
    #[must_use]
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self { from: from.into(), to: to.into(), exclude: Vec::new() }
    }
}

impl SiteSettings {
    /// Language code for the host build, defaulting to the default locale.
    #[must_use]
    pub fn effective_default_language(&self) -> &str {
        self.default_language.as_deref().unwrap_or(&self.default_locale)
    }

    /// # Errors
    /// - No locales, or a locale with an empty/duplicate code or malformed prefix
    /// - Default locale/language not declared
    /// - Fallback pattern not a valid glob, or fallback target not declared
    /// - Translation path empty or without `{locale}`, or empty key separator
    /// - Passthrough entry with empty paths or invalid exclude glob
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        self.validate_locales(&mut errors);

        let declared: HashSet<&str> = self.locales.iter().map(|l| l.code.as_str()).collect();

        if !declared.contains(self.default_locale.as_str()) {
            errors.push(ValidationError::new(
                "defaultLocale",
                format!(
                    "Default locale '{}' is not declared in 'locales'",
                    self.default_locale
                ),
            ));
        }

        if let Some(language) = &self.default_language
            && !declared.contains(language.as_str())
        {
            errors.push(ValidationError::new(
                "defaultLanguage",
                format!("Default language '{language}' is not declared in 'locales'"),
            ));
        }

        for (pattern, target) in &self.fallback_locales {
            let field_path = format!("fallbackLocales[\"{pattern}\"]");
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    field_path.clone(),
                    format!("Invalid locale pattern '{pattern}': {e}"),
                ));
            }
            if !declared.contains(target.as_str()) {
                errors.push(ValidationError::new(
                    field_path,
                    format!("Fallback target '{target}' is not a declared locale"),
                ));
            }
        }

        if !self.translations.path.contains(LOCALE_PLACEHOLDER) {
            errors.push(ValidationError::new(
                "translations.path",
                "The path must contain '{locale}'. Example: \"src/{locale}/{locale}.json\"",
            ));
        }

        if self.translations.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "translations.keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        self.validate_passthrough(&mut errors);

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Checks the locale list: presence, unique codes, well-formed unique prefixes.
    fn validate_locales(&self, errors: &mut Vec<ValidationError>) {
        if self.locales.is_empty() {
            errors.push(ValidationError::new(
                "locales",
                "At least one locale is required. Example: [{\"code\": \"en\", \"urlPrefix\": \"/en/\"}]",
            ));
        }

        let mut seen_codes = HashSet::new();
        let mut seen_prefixes = HashSet::new();

        for (index, locale) in self.locales.iter().enumerate() {
            if locale.code.is_empty() {
                errors.push(ValidationError::new(
                    format!("locales[{index}].code"),
                    "The locale code cannot be empty",
                ));
            } else if !seen_codes.insert(locale.code.as_str()) {
                errors.push(ValidationError::new(
                    format!("locales[{index}].code"),
                    format!("Duplicate locale code '{}'", locale.code),
                ));
            }

            if !locale.url_prefix.starts_with('/') || !locale.url_prefix.ends_with('/') {
                errors.push(ValidationError::new(
                    format!("locales[{index}].urlPrefix"),
                    format!(
                        "URL prefix '{}' must start and end with '/'. Example: \"/{}/\"",
                        locale.url_prefix, locale.code
                    ),
                ));
            } else if !seen_prefixes.insert(locale.url_prefix.as_str()) {
                errors.push(ValidationError::new(
                    format!("locales[{index}].urlPrefix"),
                    format!("Duplicate URL prefix '{}'", locale.url_prefix),
                ));
            }
        }
    }

    /// Checks passthrough paths and exclude globs.
    fn validate_passthrough(&self, errors: &mut Vec<ValidationError>) {
        for (index, copy) in self.passthrough.iter().enumerate() {
            if copy.from.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    format!("passthrough[{index}].from"),
                    "The source directory cannot be empty",
                ));
            }
            if copy.to.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    format!("passthrough[{index}].to"),
                    "The output directory cannot be empty",
                ));
            }
            for (exclude_index, pattern) in copy.exclude.iter().enumerate() {
                if let Err(e) = globset::Glob::new(pattern) {
                    errors.push(ValidationError::new(
                        format!("passthrough[{index}].exclude[{exclude_index}]"),
                        format!("Invalid glob pattern '{pattern}': {e}"),
                    ));
                }
            }
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            default_language: None,
            default_locale: "en".to_string(),
            locales: vec![LocaleConfig::new("en", "/en/"), LocaleConfig::new("fr", "/fr/")],
            fallback_locales: BTreeMap::from([("*".to_string(), "en".to_string())]),
            translations: TranslationFilesConfig::default(),
            missing_translation: MissingTranslationPolicy::default(),
            passthrough: vec![PassthroughCopy::new("src/assets", "_site/assets")],
        }
    }
}
