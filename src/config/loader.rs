//! サイトルートの `.site-i18n.json` を読み込む

use std::path::Path;

use super::{
    ConfigError,
    SiteSettings,
};

/// サイトルートで探す設定ファイル名
pub const CONFIG_FILE_NAME: &str = ".site-i18n.json";

/// サイトルートから設定を読み込む
///
/// 設定ファイルが無ければデフォルト設定を返す。バリデーションは行わない
/// （[`crate::Site::load`] が行う）。
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub fn read_site_settings(site_root: &Path) -> Result<SiteSettings, ConfigError> {
    let config_path = site_root.join(CONFIG_FILE_NAME);

    if !config_path.is_file() {
        tracing::debug!(path = %config_path.display(), "No configuration file, using defaults");
        return Ok(SiteSettings::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    let settings: SiteSettings = serde_json::from_str(&content)?;
    tracing::debug!(path = %config_path.display(), ?settings, "Loaded site settings");

    Ok(settings)
}
