//! 1回の実行（トップレベルのコマンド呼び出し）に紐づく状態
//!
//! タイルキャッシュは実行開始時に作られ、`close` で必ず削除される。
//! `close` を通らずに終了した場合も `TileCache` の Drop で削除される。

use crate::config::Settings;
use crate::error::Result;
use crate::paths::Paths;
use crate::tiles::{CanvasAssembler, HttpTileSource, TileCache, TileSource};
use image::RgbaImage;
use log::debug;
use wplace_check_common::AnchorConfig;

pub struct Session<S = HttpTileSource> {
    paths: Paths,
    settings: Settings,
    source: S,
    cache: TileCache,
    show_progress: bool,
}

impl Session<HttpTileSource> {
    /// 設定を読み込み、HTTPタイル取得でセッションを開始
    pub fn open(paths: Paths) -> Result<Self> {
        let settings = Settings::load(&paths)?;
        let source = HttpTileSource::new(&settings)?;
        Self::with_source(paths, settings, source)
    }
}

impl<S: TileSource> Session<S> {
    pub fn with_source(paths: Paths, settings: Settings, source: S) -> Result<Self> {
        Ok(Self {
            paths,
            settings,
            source,
            cache: TileCache::new()?,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        if let Some(concurrency) = concurrency {
            self.settings.concurrency = concurrency.max(1);
        }
        self
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn assembler(&self) -> CanvasAssembler<'_, S> {
        CanvasAssembler::new(&self.source, &self.cache)
            .with_concurrency(self.settings.concurrency)
            .with_progress(self.show_progress)
    }

    /// 参照画像を覆うリモートキャンバスを組み立てる
    pub async fn remote_canvas(&self, reference: &RgbaImage, anchor: &AnchorConfig) -> Result<RgbaImage> {
        self.assembler().create_remote_image(reference, anchor).await
    }

    /// キャッシュ統計を出力してキャッシュを削除
    pub fn close(self) {
        let stats = self.cache.stats();
        debug!(
            "Cache-Stats: {} Tiles, {:.2} MB",
            stats.cached_tiles,
            stats.size_mb()
        );
        self.cache.clear();
    }
}
