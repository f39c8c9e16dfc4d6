//! サイト設定: 型定義、バリデーション、読み込み
/// 設定ファイルの読み込み
mod loader;
/// 設定の型とバリデーション
mod types;

pub use loader::{
    CONFIG_FILE_NAME,
    read_site_settings,
};
pub use types::{
    ConfigError,
    LOCALE_PLACEHOLDER,
    LocaleConfig,
    MissingTranslationPolicy,
    PassthroughCopy,
    SiteSettings,
    TranslationFilesConfig,
    ValidationError,
};
