//! ユニットテスト用の共通ヘルパー
#![cfg(test)]

use std::collections::HashMap;

use crate::config::{
    MissingTranslationPolicy,
    SiteSettings,
};
use crate::input::translation::TranslationTable;
use crate::locale::LocaleRegistry;
use crate::translator::Translator;

/// キーと値のペアからメモリ上の翻訳テーブルを作成
pub(crate) fn create_table(locale: &str, keys: &[(&str, &str)]) -> TranslationTable {
    let keys: HashMap<String, String> =
        keys.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    TranslationTable::new(locale, format!("{locale}.json"), keys)
}

/// `en` と `fr`、デフォルト `en`、フォールバック `*` → `en`
#[allow(clippy::expect_used)]
pub(crate) fn create_registry() -> LocaleRegistry {
    LocaleRegistry::from_settings(&SiteSettings::default()).expect("default settings are valid")
}

/// デフォルトのレジストリとプレースホルダー方式の Translator を作成
pub(crate) fn create_translator(en: &[(&str, &str)], fr: &[(&str, &str)]) -> Translator {
    Translator::new(
        create_registry(),
        vec![create_table("en", en), create_table("fr", fr)],
        MissingTranslationPolicy::Placeholder,
    )
}
