//! site-i18n
//!
//! Locale resolution, translation lookup and static asset passthrough for static-site builds.

pub mod audit;
pub mod config;
pub mod input;
pub mod locale;
pub mod passthrough;
pub mod site;
pub mod translator;

mod test_utils;

pub use locale::{
    Locale,
    LocaleRegistry,
};
pub use site::{
    BuildError,
    Site,
};
pub use translator::{
    TranslationError,
    Translator,
};
