//! タイルキャッシュモジュール
//!
//! 1回の実行中に同じタイルを何度も取得しないよう、初回取得時に
//! デコード済みタイルをPNGとして一時ディレクトリに保存し、
//! 2回目以降はそこから読み込む。内容の鮮度チェックは行わないため、
//! 実行の終わりに必ず `clear` で削除する（Drop時にも削除される）。

use super::TileSource;
use crate::error::{CheckError, Result};
use image::{ImageFormat, RgbaImage};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;
use tokio::sync::OnceCell;
use wplace_check_common::TileCoordinate;

const CACHE_DIR_PREFIX: &str = "wplace-tile-cache-";

/// 座標ごとのエントリ（初回取得が終わるまで他の取得者は待つ）
type CacheSlot = Arc<OnceCell<PathBuf>>;

/// キャッシュ統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub cached_tiles: usize,
    pub cache_size_bytes: u64,
}

impl CacheStats {
    pub fn size_mb(&self) -> f64 {
        self.cache_size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// 実行スコープのタイルキャッシュ
#[derive(Debug)]
pub struct TileCache {
    dir: TempDir,
    entries: Mutex<HashMap<TileCoordinate, CacheSlot>>,
}

impl TileCache {
    /// システムの一時ディレクトリ配下に作成
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(CACHE_DIR_PREFIX).tempdir()?;
        Ok(Self::with_dir(dir))
    }

    fn with_dir(dir: TempDir) -> Self {
        Self {
            dir,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<TileCoordinate, CacheSlot>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// キャッシュ済みファイルのパス
    pub fn cached_path(&self, coord: TileCoordinate) -> Option<PathBuf> {
        self.entries().get(&coord).and_then(|slot| slot.get().cloned())
    }

    /// キャッシュから取得、なければ source から取得して保存
    ///
    /// 同じ座標への同時要求はダウンロード1回にまとめられる。
    pub async fn get_or_fetch<S: TileSource>(&self, source: &S, coord: TileCoordinate) -> Result<RgbaImage> {
        let slot = self.entries().entry(coord).or_default().clone();

        let mut downloaded: Option<RgbaImage> = None;
        let downloaded_ref = &mut downloaded;
        let path = slot
            .get_or_try_init(move || async move {
                let tile = source.fetch_tile(coord).await?;
                let path = self.persist(coord, &tile)?;
                *downloaded_ref = Some(tile);
                Ok::<PathBuf, CheckError>(path)
            })
            .await?;

        if let Some(tile) = downloaded {
            return Ok(tile);
        }

        debug!("キャッシュから読み込み: {}", coord);
        load_cached(coord, path)
    }

    fn persist(&self, coord: TileCoordinate, tile: &RgbaImage) -> Result<PathBuf> {
        let path = self
            .dir
            .path()
            .join(format!("tile_cache_{}.png", coord.cache_key()));
        tile.save_with_format(&path, ImageFormat::Png)?;
        debug!("タイルをキャッシュ: {} -> {}", coord, path.display());
        Ok(path)
    }

    /// キャッシュ済みタイル数
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let paths: Vec<PathBuf> = self
            .entries()
            .values()
            .filter_map(|slot| slot.get().cloned())
            .collect();

        let cache_size_bytes = paths
            .iter()
            .filter_map(|path| std::fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        CacheStats {
            cached_tiles: paths.len(),
            cache_size_bytes,
        }
    }

    /// 保存済みタイルをすべて削除してインデックスをリセット
    ///
    /// 削除に失敗しても照合結果には影響しないため、警告ログのみ。
    pub fn clear(&self) {
        let drained: Vec<CacheSlot> = self.entries().drain().map(|(_, slot)| slot).collect();

        for slot in drained {
            let Some(path) = slot.get() else {
                continue;
            };
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("キャッシュファイルを削除できません {}: {}", path.display(), e);
                }
            }
        }
    }
}

impl Drop for TileCache {
    fn drop(&mut self) {
        self.clear();
    }
}

fn load_cached(coord: TileCoordinate, path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| CheckError::TileUnavailable {
        coord,
        reason: format!("キャッシュを読み込めません {}: {}", path.display(), e),
    })?;
    Ok(image.to_rgba8())
}
