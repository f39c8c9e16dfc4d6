//! 1 回のサイトビルド: 検証済みの設定、読み込んだ翻訳、静的アセットのコピー

use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use crate::audit::{
    MissingKey,
    find_missing_translations,
};
use crate::config::{
    ConfigError,
    SiteSettings,
    read_site_settings,
};
use crate::input::translation::{
    TranslationLoadError,
    TranslationTable,
    load_translation_file,
};
use crate::locale::{
    Locale,
    LocaleError,
    LocaleRegistry,
};
use crate::passthrough::{
    CopyReport,
    PassthroughError,
    copy_passthrough,
};
use crate::translator::Translator;

/// ビルドを中断するエラー
#[derive(Error, Debug)]
pub enum BuildError {
    /// 設定ファイルの読み込み・バリデーション失敗
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// ロケール定義の不整合
    #[error(transparent)]
    Locale(#[from] LocaleError),

    /// 翻訳ファイルの読み込み失敗
    #[error(transparent)]
    Translation(#[from] TranslationLoadError),

    /// 静的アセットのコピー失敗
    #[error(transparent)]
    Passthrough(#[from] PassthroughError),
}

/// ページ生成に必要なものをまとめたもの。利用側へ明示的に渡す
#[derive(Debug)]
pub struct Site {
    /// 設定中のパスの基準ディレクトリ
    root: PathBuf,
    /// 検証済みの設定
    settings: SiteSettings,
    /// 読み込んだ翻訳の検索
    translator: Translator,
}

impl Site {
    /// `root` の `.site-i18n.json` を読み込み（無ければデフォルト設定）、サイトを読み込む
    ///
    /// # Errors
    /// - 設定ファイルの読み込み・パースエラー
    /// - [`Site::load`] のエラー
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let root = root.into();
        let settings = read_site_settings(&root)?;

        Self::load(root, settings)
    }

    /// `settings` を検証し、宣言された全ロケールの翻訳ファイルを読み込む
    ///
    /// # Errors
    /// - 設定のバリデーションエラー
    /// - 翻訳ファイルが存在しない、または不正
    pub fn load(root: impl Into<PathBuf>, settings: SiteSettings) -> Result<Self, BuildError> {
        let root = root.into();
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        let registry = LocaleRegistry::from_settings(&settings)?;

        let tables = registry
            .locales()
            .iter()
            .map(|locale| {
                let path = root.join(settings.translations.path_for(locale.code()));
                load_translation_file(locale.code(), &path, &settings.translations.key_separator)
            })
            .collect::<Result<Vec<TranslationTable>, _>>()?;

        tracing::info!(
            locales = registry.locales().len(),
            default_locale = registry.default_locale().code(),
            default_language = settings.effective_default_language(),
            "Loaded translations"
        );

        let translator = Translator::new(registry, tables, settings.missing_translation);

        Ok(Self { root, settings, translator })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    #[must_use]
    pub const fn translator(&self) -> &Translator {
        &self.translator
    }

    /// ホストのビルドが `<html lang>` などに使う言語
    ///
    /// `defaultLanguage` が未設定ならデフォルトロケール。
    #[must_use]
    pub fn default_language(&self) -> &Locale {
        self.translator
            .registry()
            .resolve_locale(Some(self.settings.effective_default_language()))
    }

    /// 設定された静的アセットを出力先へコピーする
    ///
    /// # Errors
    /// [`copy_passthrough`] を参照
    pub fn copy_passthrough(&self) -> Result<CopyReport, BuildError> {
        let report = copy_passthrough(&self.root, &self.settings.passthrough)?;
        tracing::info!(files = report.files, bytes = report.bytes, "Copied passthrough assets");
        Ok(report)
    }

    /// 全ロケールの翻訳漏れ
    #[must_use]
    pub fn audit(&self) -> Vec<MissingKey> {
        find_missing_translations(&self.translator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::config::CONFIG_FILE_NAME;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// デフォルトでは `src/<code>/<code>.json` を読む
    #[rstest]
    fn load_reads_one_table_per_locale() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/en/en.json", r#"{"greeting": "Hello"}"#);
        write(temp_dir.path(), "src/fr/fr.json", "{}");

        let site = Site::load(temp_dir.path(), SiteSettings::default()).unwrap();
        let translator = site.translator();
        let fr = translator.registry().resolve_locale(Some("fr"));

        assert_eq!(translator.translate(fr, "greeting"), Ok("Hello"));
        assert_eq!(translator.table("fr").map(TranslationTable::len), Some(0));
        assert!(
            translator
                .table("fr")
                .is_some_and(|table| table.file_path().ends_with("src/fr/fr.json"))
        );
        assert_eq!(site.root(), temp_dir.path());
    }

    #[rstest]
    fn load_fails_when_a_locale_file_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/en/en.json", r#"{"greeting": "Hello"}"#);

        let result = Site::load(temp_dir.path(), SiteSettings::default());

        assert!(matches!(
            result,
            Err(BuildError::Translation(TranslationLoadError::Io { path, .. }))
                if path.ends_with("fr.json")
        ));
    }

    #[rstest]
    fn load_fails_on_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/en/en.json", r#"{"greeting": "Hello""#);
        write(temp_dir.path(), "src/fr/fr.json", "{}");

        let result = Site::load(temp_dir.path(), SiteSettings::default());

        assert!(matches!(
            result,
            Err(BuildError::Translation(TranslationLoadError::Parse { .. }))
        ));
    }

    #[rstest]
    fn load_rejects_invalid_settings_before_reading_files() {
        let temp_dir = TempDir::new().unwrap();
        let settings =
            SiteSettings { default_locale: "de".to_string(), ..SiteSettings::default() };

        let result = Site::load(temp_dir.path(), settings);

        assert!(matches!(result, Err(BuildError::Config(ConfigError::ValidationErrors(_)))));
    }

    #[rstest]
    fn open_uses_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = r#"{
            "translations": {"path": "i18n/{locale}.json", "keySeparator": "_"},
            "passthrough": []
        }"#;
        write(temp_dir.path(), CONFIG_FILE_NAME, config);
        write(temp_dir.path(), "i18n/en.json", r#"{"nav": {"home": "Home"}}"#);
        write(temp_dir.path(), "i18n/fr.json", r#"{"nav": {"home": "Accueil"}}"#);

        let site = Site::open(temp_dir.path()).unwrap();
        let fr = site.translator().registry().resolve_locale(Some("fr"));

        assert_eq!(site.translator().translate(fr, "nav_home"), Ok("Accueil"));
        assert!(site.settings().passthrough.is_empty());
        assert_eq!(site.copy_passthrough().unwrap(), CopyReport::default());
    }

    /// defaultLanguage はデフォルトロケールと独立に指定できる
    #[rstest]
    #[case::unset(None, "en")]
    #[case::explicit(Some("fr"), "fr")]
    fn default_language_follows_settings(#[case] language: Option<&str>, #[case] expected: &str) {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/en/en.json", "{}");
        write(temp_dir.path(), "src/fr/fr.json", "{}");
        let settings = SiteSettings {
            default_language: language.map(ToString::to_string),
            ..SiteSettings::default()
        };

        let site = Site::load(temp_dir.path(), settings).unwrap();

        assert_eq!(site.default_language().code(), expected);
        assert_eq!(site.translator().registry().default_locale().code(), "en");
    }

    #[rstest]
    fn audit_reports_gaps() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/en/en.json", r#"{"a": "A", "b": "B"}"#);
        write(temp_dir.path(), "src/fr/fr.json", r#"{"a": "A"}"#);

        let site = Site::load(temp_dir.path(), SiteSettings::default()).unwrap();
        let missing = site.audit();

        assert_eq!(missing.len(), 1);
        assert_eq!(missing.first().map(|m| m.key.as_str()), Some("b"));
        assert!(missing.iter().all(MissingKey::is_covered));
    }
}
