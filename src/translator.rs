//! Translation lookup over the immutable tables of one build.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::MissingTranslationPolicy;
use crate::input::translation::TranslationTable;
use crate::locale::{
    Locale,
    LocaleRegistry,
};

/// Lookup failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Neither the locale nor its fallback has the key.
    #[error("Missing translation for key '{key}' in locale '{locale}'")]
    MissingTranslation { locale: String, key: String },
}

/// Resolves translation keys for declared locales.
///
/// Immutable once built; one instance is shared by every page worker.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Declared locales and fallback rules
    registry: LocaleRegistry,
    /// Locale code → table. Every declared locale has an entry.
    tables: HashMap<String, TranslationTable>,
    /// Behaviour of `render` for missing keys
    policy: MissingTranslationPolicy,
}

impl Translator {
    /// Builds a translator. Declared locales without a table get an empty one;
    /// tables for undeclared locales are dropped.
    #[must_use]
    pub fn new(
        registry: LocaleRegistry,
        tables: Vec<TranslationTable>,
        policy: MissingTranslationPolicy,
    ) -> Self {
        let mut tables: HashMap<String, TranslationTable> = tables
            .into_iter()
            .filter(|table| {
                let declared = registry.is_declared(table.locale());
                if !declared {
                    tracing::warn!(
                        locale = table.locale(),
                        "Ignoring table for undeclared locale"
                    );
                }
                declared
            })
            .map(|table| (table.locale().to_string(), table))
            .collect();

        for locale in registry.locales() {
            tables.entry(locale.code().to_string()).or_insert_with(|| {
                tracing::debug!(
                    locale = locale.code(),
                    "No translations supplied, using empty table"
                );
                TranslationTable::empty(locale.code())
            });
        }

        Self { registry, tables, policy }
    }

    #[must_use]
    pub const fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn policy(&self) -> MissingTranslationPolicy {
        self.policy
    }

    #[must_use]
    pub fn table(&self, code: &str) -> Option<&TranslationTable> {
        self.tables.get(code)
    }

    /// Looks `key` up in `locale`, then once in its fallback locale.
    ///
    /// # Errors
    /// `MissingTranslation` when neither table has the key.
    pub fn translate(&self, locale: &Locale, key: &str) -> Result<&str, TranslationError> {
        if let Some(value) = self.lookup(locale, key) {
            return Ok(value);
        }

        if let Some(fallback) = self.registry.fallback_for(locale)
            && let Some(value) = self.lookup(fallback, key)
        {
            tracing::trace!(
                locale = locale.code(),
                fallback = fallback.code(),
                key,
                "Resolved through fallback"
            );
            return Ok(value);
        }

        Err(TranslationError::MissingTranslation {
            locale: locale.code().to_string(),
            key: key.to_string(),
        })
    }

    /// Translates `key` and fills `{{ name }}` placeholders from `data`.
    ///
    /// A missing key is never rendered as an empty string: under
    /// [`MissingTranslationPolicy::Placeholder`] it is logged and the key
    /// itself is returned.
    ///
    /// # Errors
    /// `MissingTranslation` under [`MissingTranslationPolicy::Error`].
    pub fn render(
        &self,
        locale: &Locale,
        key: &str,
        data: &HashMap<String, String>,
    ) -> Result<String, TranslationError> {
        match self.translate(locale, key) {
            Ok(value) => Ok(interpolate(value, data)),
            Err(error) => match self.policy {
                MissingTranslationPolicy::Placeholder => {
                    tracing::warn!("{error}");
                    Ok(key.to_string())
                }
                MissingTranslationPolicy::Error => Err(error),
            },
        }
    }

    /// Single-table lookup without fallback.
    fn lookup(&self, locale: &Locale, key: &str) -> Option<&str> {
        self.tables.get(locale.code()).and_then(|table| table.get(key))
    }
}

/// Replaces `{{ name }}` placeholders with values from `data`.
///
/// Whitespace inside the braces is ignored. Placeholders without a value, and
/// an unterminated `{{`, are left as written.
#[must_use]
pub fn interpolate(template: &str, data: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((before, after_open)) = rest.split_once("{{") {
        result.push_str(before);

        let Some((name, after_close)) = after_open.split_once("}}") else {
            result.push_str("{{");
            rest = after_open;
            break;
        };

        if let Some(value) = data.get(name.trim()) {
            result.push_str(value);
        } else {
            result.push_str("{{");
            result.push_str(name);
            result.push_str("}}");
        }
        rest = after_close;
    }

    result.push_str(rest);
    result
}
