//! 宣言された全ロケールを横断した翻訳漏れの検出

use std::collections::BTreeSet;

use crate::translator::Translator;

/// どこかのロケールには存在するが `locale` には無いキー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub locale: String,
    pub key: String,
    /// キーを補うフォールバック先のロケール
    pub covered_by: Option<String>,
}

impl MissingKey {
    /// フォールバックで表示できる場合に true
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.covered_by.is_some()
    }
}

/// 全ての (ロケール, キー) の漏れを列挙する。ロケールの宣言順、キー順に並ぶ
#[must_use]
pub fn find_missing_translations(translator: &Translator) -> Vec<MissingKey> {
    let registry = translator.registry();

    let all_keys: BTreeSet<&str> = registry
        .locales()
        .iter()
        .filter_map(|locale| translator.table(locale.code()))
        .flat_map(|table| table.keys().keys().map(String::as_str))
        .collect();

    let mut missing = Vec::new();

    for locale in registry.locales() {
        let Some(table) = translator.table(locale.code()) else {
            continue;
        };
        let fallback = registry.fallback_for(locale);

        for key in all_keys.iter().copied().filter(|key| !table.contains_key(key)) {
            let covered_by = fallback
                .filter(|fb| translator.table(fb.code()).is_some_and(|t| t.contains_key(key)))
                .map(|fb| fb.code().to_string());

            missing.push(MissingKey {
                locale: locale.code().to_string(),
                key: key.to_string(),
                covered_by,
            });
        }
    }

    tracing::debug!(
        total = missing.len(),
        uncovered = missing.iter().filter(|m| !m.is_covered()).count(),
        "Translation audit finished"
    );

    missing
}
