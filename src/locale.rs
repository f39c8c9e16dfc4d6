//! Declared locales, locale resolution and fallback rules.

use globset::{
    Glob,
    GlobMatcher,
};
use thiserror::Error;

use crate::config::SiteSettings;

/// Inconsistent locale declarations.
#[derive(Error, Debug)]
pub enum LocaleError {
    /// Empty locale list
    #[error("At least one locale must be declared")]
    NoLocales,

    /// Default code missing from the locale list
    #[error("Default locale '{0}' is not declared")]
    UnknownDefaultLocale(String),

    /// Fallback rule pointing at an undeclared locale
    #[error("Fallback target '{target}' for pattern '{pattern}' is not declared")]
    UnknownFallbackTarget { pattern: String, target: String },

    /// Fallback pattern that is not a valid glob
    #[error("Invalid fallback pattern '{pattern}': {source}")]
    InvalidFallbackPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// A declared locale and the URL segment its pages live under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    /// Identifier such as `en` or `fr-CA`
    code: String,
    /// Path segment with leading and trailing `/`
    url_prefix: String,
}

impl Locale {
    #[must_use]
    pub fn new(code: impl Into<String>, url_prefix: impl Into<String>) -> Self {
        Self { code: code.into(), url_prefix: url_prefix.into() }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }
}

/// Maps locales matching `pattern` to the `target` locale for missing keys.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    /// Glob source, kept for exact-match precedence and error messages
    pattern: String,
    /// Compiled `pattern`
    matcher: GlobMatcher,
    /// Fallback locale code
    target: String,
}

impl FallbackRule {
    /// # Errors
    /// `pattern` is not a valid glob.
    pub fn new(pattern: impl Into<String>, target: impl Into<String>) -> Result<Self, LocaleError> {
        let pattern = pattern.into();
        let matcher = Glob::new(&pattern)
            .map_err(|source| LocaleError::InvalidFallbackPattern {
                pattern: pattern.clone(),
                source,
            })?
            .compile_matcher();

        Ok(Self { pattern, matcher, target: target.into() })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        self.matcher.is_match(code)
    }
}

/// The fixed set of locales for one build.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    /// Declared locales, in declaration order.
    locales: Vec<Locale>,

    /// Copy of the declared default
    default_locale: Locale,

    /// Rules in lexical pattern order.
    fallback_rules: Vec<FallbackRule>,
}

impl LocaleRegistry {
    /// # Errors
    /// - `locales` is empty
    /// - `default_code` is not declared
    /// - A fallback target is not declared
    pub fn new(
        locales: Vec<Locale>,
        default_code: &str,
        fallback_rules: Vec<FallbackRule>,
    ) -> Result<Self, LocaleError> {
        if locales.is_empty() {
            return Err(LocaleError::NoLocales);
        }

        let default_locale = locales
            .iter()
            .find(|l| l.code == default_code)
            .cloned()
            .ok_or_else(|| LocaleError::UnknownDefaultLocale(default_code.to_string()))?;

        if let Some(rule) =
            fallback_rules.iter().find(|rule| !locales.iter().any(|l| l.code == rule.target))
        {
            return Err(LocaleError::UnknownFallbackTarget {
                pattern: rule.pattern.clone(),
                target: rule.target.clone(),
            });
        }

        let mut fallback_rules = fallback_rules;
        fallback_rules.sort_by(|a, b| a.pattern.cmp(&b.pattern));

        Ok(Self { locales, default_locale, fallback_rules })
    }

    /// # Errors
    /// See [`LocaleRegistry::new`].
    pub fn from_settings(settings: &SiteSettings) -> Result<Self, LocaleError> {
        let locales = settings
            .locales
            .iter()
            .map(|l| Locale::new(l.code.clone(), l.url_prefix.clone()))
            .collect();

        let fallback_rules = settings
            .fallback_locales
            .iter()
            .map(|(pattern, target)| FallbackRule::new(pattern.clone(), target.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(locales, &settings.default_locale, fallback_rules)
    }

    #[must_use]
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    #[must_use]
    pub const fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.code == code)
    }

    #[must_use]
    pub fn is_declared(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Returns the requested locale if declared, otherwise the default locale.
    #[must_use]
    pub fn resolve_locale(&self, requested: Option<&str>) -> &Locale {
        match requested.and_then(|code| self.get(code)) {
            Some(locale) => locale,
            None => {
                if let Some(code) = requested {
                    tracing::debug!(requested = code, "Unknown locale, using default");
                }
                &self.default_locale
            }
        }
    }

    /// URL prefix configured for `locale` (e.g. `/fr/`).
    #[must_use]
    pub fn url_prefix_for<'a>(&'a self, locale: &'a Locale) -> &'a str {
        self.get(&locale.code).map_or(&locale.url_prefix, |declared| &declared.url_prefix)
    }

    /// Locale consulted when `locale` lacks a key.
    ///
    /// A rule naming the locale exactly wins over glob rules. A rule that
    /// points a locale at itself yields `None`.
    #[must_use]
    pub fn fallback_for(&self, locale: &Locale) -> Option<&Locale> {
        let rule = self
            .fallback_rules
            .iter()
            .find(|rule| rule.pattern == locale.code)
            .or_else(|| self.fallback_rules.iter().find(|rule| rule.matches(&locale.code)))?;

        if rule.target == locale.code {
            return None;
        }

        self.get(&rule.target)
    }

    /// Infers the page locale from its URL, defaulting when no prefix matches.
    #[must_use]
    pub fn locale_from_url(&self, url: &str) -> &Locale {
        self.split_url(url).map_or(&self.default_locale, |(locale, _)| locale)
    }

    /// Rewrites `url` so it lives under `target`'s prefix.
    ///
    /// `/en/about/` becomes `/fr/about/`; an unprefixed `/about/` becomes `/fr/about/`.
    #[must_use]
    pub fn localize_url(&self, url: &str, target: &Locale) -> String {
        let rest =
            self.split_url(url).map_or_else(|| url.trim_start_matches('/'), |(_, rest)| rest);
        format!("{}{rest}", self.url_prefix_for(target))
    }

    /// The same page in every declared locale, in declaration order.
    #[must_use]
    pub fn alternate_urls(&self, url: &str) -> Vec<(&Locale, String)> {
        self.locales.iter().map(|locale| (locale, self.localize_url(url, locale))).collect()
    }

    /// Splits `url` into the locale whose prefix it carries and the remainder.
    ///
    /// The longest matching prefix wins so a root prefix (`/`) never shadows `/fr/`.
    fn split_url<'a>(&self, url: &'a str) -> Option<(&Locale, &'a str)> {
        self.locales
            .iter()
            .filter_map(|locale| {
                if let Some(rest) = url.strip_prefix(locale.url_prefix.as_str()) {
                    return Some((locale, rest));
                }
                let bare = locale.url_prefix.trim_end_matches('/');
                (!bare.is_empty() && url == bare).then_some((locale, ""))
            })
            .max_by_key(|(locale, _)| locale.url_prefix.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::config::LocaleConfig;

    #[fixture]
    fn registry() -> LocaleRegistry {
        LocaleRegistry::from_settings(&SiteSettings::default()).unwrap()
    }

    #[rstest]
    fn from_settings_declares_locales_in_order(registry: LocaleRegistry) {
        let codes: Vec<&str> = registry.locales().iter().map(Locale::code).collect();

        assert_that!(codes, elements_are![eq(&"en"), eq(&"fr")]);
        assert_that!(registry.default_locale().code(), eq("en"));
    }

    #[rstest]
    #[case::english("en", "/en/")]
    #[case::french("fr", "/fr/")]
    fn url_prefix_for_declared_locales(
        registry: LocaleRegistry,
        #[case] code: &str,
        #[case] expected: &str,
    ) {
        let locale = registry.get(code).unwrap();

        assert_eq!(registry.url_prefix_for(locale), expected);
        assert_eq!(registry.url_prefix_for(locale), registry.url_prefix_for(locale));
    }

    #[rstest]
    #[case::none(None, "en")]
    #[case::undeclared(Some("xx"), "en")]
    #[case::empty(Some(""), "en")]
    #[case::case_sensitive(Some("FR"), "en")]
    #[case::french(Some("fr"), "fr")]
    #[case::english(Some("en"), "en")]
    fn resolve_locale(
        registry: LocaleRegistry,
        #[case] requested: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(registry.resolve_locale(requested).code(), expected);
    }

    #[rstest]
    fn fallback_wildcard_applies_to_every_other_locale(registry: LocaleRegistry) {
        let fr = registry.get("fr").unwrap();
        let en = registry.get("en").unwrap();

        assert_that!(registry.fallback_for(fr).map(Locale::code), some(eq("en")));
        // The wildcard also matches the target itself, which is not a fallback.
        assert_that!(registry.fallback_for(en), none());
    }

    #[rstest]
    fn fallback_exact_rule_wins_over_glob() {
        let settings = SiteSettings {
            locales: vec![
                LocaleConfig::new("en", "/"),
                LocaleConfig::new("fr", "/fr/"),
                LocaleConfig::new("fr-CA", "/fr-ca/"),
            ],
            fallback_locales: BTreeMap::from([
                ("*".to_string(), "en".to_string()),
                ("fr-CA".to_string(), "fr".to_string()),
            ]),
            ..SiteSettings::default()
        };
        let registry = LocaleRegistry::from_settings(&settings).unwrap();

        let fr_ca = registry.get("fr-CA").unwrap();
        let fr = registry.get("fr").unwrap();

        assert_that!(registry.fallback_for(fr_ca).map(Locale::code), some(eq("fr")));
        assert_that!(registry.fallback_for(fr).map(Locale::code), some(eq("en")));
    }

    #[rstest]
    fn fallback_without_rules_is_none() {
        let locales = vec![Locale::new("en", "/en/"), Locale::new("fr", "/fr/")];
        let registry = LocaleRegistry::new(locales, "en", vec![]).unwrap();

        assert_that!(registry.fallback_for(registry.get("fr").unwrap()), none());
    }

    #[rstest]
    fn new_rejects_empty_locales() {
        let result = LocaleRegistry::new(vec![], "en", vec![]);

        assert!(matches!(result, Err(LocaleError::NoLocales)));
    }

    #[rstest]
    fn new_rejects_undeclared_default() {
        let result = LocaleRegistry::new(vec![Locale::new("en", "/en/")], "fr", vec![]);

        assert!(matches!(result, Err(LocaleError::UnknownDefaultLocale(code)) if code == "fr"));
    }

    #[rstest]
    fn new_rejects_undeclared_fallback_target() {
        let rule = FallbackRule::new("*", "de").unwrap();
        let result = LocaleRegistry::new(vec![Locale::new("en", "/en/")], "en", vec![rule]);

        assert!(matches!(
            result,
            Err(LocaleError::UnknownFallbackTarget { pattern, target })
                if pattern == "*" && target == "de"
        ));
    }

    #[rstest]
    fn fallback_rule_rejects_invalid_glob() {
        let result = FallbackRule::new("fr-[", "en");

        assert!(matches!(result, Err(LocaleError::InvalidFallbackPattern { .. })));
    }

    #[rstest]
    #[case::wildcard("*", "fr-CA", true)]
    #[case::prefix_glob("fr-*", "fr-CA", true)]
    #[case::prefix_glob_miss("fr-*", "fr", false)]
    #[case::exact("fr", "fr", true)]
    fn fallback_rule_matches(#[case] pattern: &str, #[case] code: &str, #[case] expected: bool) {
        let rule = FallbackRule::new(pattern, "en").unwrap();

        assert_eq!(rule.matches(code), expected);
    }

    #[rstest]
    #[case::french_page("/fr/about/", "fr")]
    #[case::french_root("/fr/", "fr")]
    #[case::french_bare("/fr", "fr")]
    #[case::english_page("/en/blog/post/", "en")]
    #[case::unprefixed("/about/", "en")]
    #[case::lookalike("/french/", "en")]
    fn locale_from_url(registry: LocaleRegistry, #[case] url: &str, #[case] expected: &str) {
        assert_eq!(registry.locale_from_url(url).code(), expected);
    }

    #[rstest]
    #[case::swap_prefix("/en/about/", "fr", "/fr/about/")]
    #[case::same_locale("/fr/about/", "fr", "/fr/about/")]
    #[case::unprefixed("/about/", "fr", "/fr/about/")]
    #[case::root("/", "fr", "/fr/")]
    #[case::bare_prefix("/en", "fr", "/fr/")]
    fn localize_url(
        registry: LocaleRegistry,
        #[case] url: &str,
        #[case] target: &str,
        #[case] expected: &str,
    ) {
        let target = registry.get(target).unwrap();

        assert_eq!(registry.localize_url(url, target), expected);
    }

    #[rstest]
    fn localize_url_with_root_prefix_locale() {
        let registry = LocaleRegistry::new(
            vec![Locale::new("en", "/"), Locale::new("fr", "/fr/")],
            "en",
            vec![],
        )
        .unwrap();

        let en = registry.get("en").unwrap();
        let fr = registry.get("fr").unwrap();

        assert_eq!(registry.locale_from_url("/fr/about/").code(), "fr");
        assert_eq!(registry.locale_from_url("/about/").code(), "en");
        assert_eq!(registry.localize_url("/fr/about/", en), "/about/");
        assert_eq!(registry.localize_url("/about/", fr), "/fr/about/");
    }

    #[rstest]
    fn alternate_urls_cover_every_locale(registry: LocaleRegistry) {
        let alternates: Vec<(&str, String)> = registry
            .alternate_urls("/en/contact/")
            .into_iter()
            .map(|(locale, url)| (locale.code(), url))
            .collect();

        assert_eq!(
            alternates,
            vec![("en", "/en/contact/".to_string()), ("fr", "/fr/contact/".to_string())]
        );
    }
}
