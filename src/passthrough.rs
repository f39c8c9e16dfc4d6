//! 静的アセットを出力先へそのままコピーする

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use thiserror::Error;

use crate::config::PassthroughCopy;

/// コピー中のエラー
#[derive(Error, Debug)]
pub enum PassthroughError {
    /// 除外パターンが不正な glob
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// ディレクトリ走査の失敗
    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// ファイルのコピー失敗
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// コピー結果の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub files: usize,
    pub bytes: u64,
}

impl std::ops::AddAssign for CopyReport {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.bytes += other.bytes;
    }
}

/// 設定された全エントリをコピーする。パスは `site_root` からの相対
///
/// 存在しないコピー元は警告を出してスキップする。
///
/// # Errors
/// 最初に失敗したエントリで中断
pub fn copy_passthrough(
    site_root: &Path,
    entries: &[PassthroughCopy],
) -> Result<CopyReport, PassthroughError> {
    let mut report = CopyReport::default();

    for entry in entries {
        let from = site_root.join(&entry.from);
        let to = site_root.join(&entry.to);

        if from.is_file() {
            report += CopyReport { files: 1, bytes: copy_file(&from, &to)? };
        } else if from.is_dir() {
            report += copy_dir(&from, &to, &entry.exclude)?;
        } else {
            tracing::warn!(from = %from.display(), "Passthrough source not found, skipping");
        }
    }

    Ok(report)
}

/// `from` 以下のファイルを相対パスを保って `to` へコピーする
///
/// 隠しファイルもコピーし、.gitignore 等は見ない。シンボリックリンクは辿らない。
///
/// # Errors
/// - 除外パターンが不正
/// - ディレクトリエントリの読み込み、またはファイルのコピーに失敗
pub fn copy_dir(
    from: &Path,
    to: &Path,
    exclude_patterns: &[String],
) -> Result<CopyReport, PassthroughError> {
    let exclude_set = build_exclude_set(exclude_patterns)?;
    let mut report = CopyReport::default();

    tracing::debug!(from = %from.display(), to = %to.display(), "Copying passthrough assets");

    for result in WalkBuilder::new(from)
        .standard_filters(false)
        .follow_links(false)
        .build()
    {
        let entry =
            result.map_err(|source| PassthroughError::Walk { path: from.to_path_buf(), source })?;

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();

        // コピー元の中に出力先がある場合、出力先自身はコピーしない
        if path.starts_with(to) {
            continue;
        }

        let Ok(relative_path) = path.strip_prefix(from) else {
            continue;
        };
        if exclude_set.is_match(relative_path) {
            tracing::trace!(path = %relative_path.display(), "Excluded from passthrough");
            continue;
        }

        let target = to.join(relative_path);
        report.bytes += copy_file(path, &target)?;
        report.files += 1;
    }

    tracing::debug!(files = report.files, bytes = report.bytes, "Passthrough copy finished");

    Ok(report)
}

/// 親ディレクトリを作成して 1 ファイルをコピーし、書き込んだバイト数を返す
fn copy_file(from: &Path, to: &Path) -> Result<u64, PassthroughError> {
    let io_error = |source| PassthroughError::Io {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::copy(from, to).map_err(io_error)
}

/// 除外パターンを 1 つの `GlobSet` にまとめる
fn build_exclude_set(patterns: &[String]) -> Result<GlobSet, PassthroughError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| PassthroughError::InvalidExclude {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| PassthroughError::InvalidExclude {
        pattern: patterns.join(", "),
        source,
    })
}
