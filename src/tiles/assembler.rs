use super::cache::TileCache;
use super::fetcher::validate_tile;
use super::TileSource;
use crate::error::{CheckError, Result};
use futures::stream::{self, StreamExt};
use image::{imageops, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use wplace_check_common::{AnchorConfig, TileCoordinate};

/// `offset + length` ピクセルを覆うのに必要なタイル数（u32 を超える範囲なら None）
pub fn tile_count(offset: u32, length: u32, tile_size: u32) -> Option<u32> {
    offset.checked_add(length).map(|end| end.div_ceil(tile_size))
}

/// グリッド上の1マス: 取得するタイルとキャンバス上の貼り付け位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub coord: TileCoordinate,
    pub dest_x: u32,
    pub dest_y: u32,
}

/// 参照画像を覆うタイルグリッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub origin: TileCoordinate,
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub tile_size: u32,
}

impl TileGrid {
    /// キャンバスの寸法・タイル座標が u32 に収まらない配置は設定エラー
    pub fn for_reference(anchor: &AnchorConfig, width: u32, height: u32, tile_size: u32) -> Result<Self> {
        let out_of_range = |axis: &str| {
            CheckError::Config(format!(
                "{}方向の範囲が大きすぎます: タイル {}, {}, オフセット {}, {}, 画像 {}x{}",
                axis, anchor.tile_x, anchor.tile_y, anchor.offset_x, anchor.offset_y, width, height
            ))
        };

        let origin = anchor.origin_tile();
        let tiles_x = tile_count(anchor.offset_x, width, tile_size).ok_or_else(|| out_of_range("X"))?;
        let tiles_y = tile_count(anchor.offset_y, height, tile_size).ok_or_else(|| out_of_range("Y"))?;

        // 最後のタイル座標とキャンバス寸法
        let fits = |origin: u32, tiles: u32| {
            origin.checked_add(tiles.saturating_sub(1)).is_some() && tiles.checked_mul(tile_size).is_some()
        };
        if !fits(origin.x, tiles_x) {
            return Err(out_of_range("X"));
        }
        if !fits(origin.y, tiles_y) {
            return Err(out_of_range("Y"));
        }

        Ok(Self {
            origin,
            tiles_x,
            tiles_y,
            tile_size,
        })
    }

    pub fn canvas_width(&self) -> u32 {
        self.tiles_x * self.tile_size
    }

    pub fn canvas_height(&self) -> u32 {
        self.tiles_y * self.tile_size
    }

    pub fn len(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// x を外側、y を内側にした順でマスを列挙
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::with_capacity(self.len());
        for x in 0..self.tiles_x {
            for y in 0..self.tiles_y {
                cells.push(GridCell {
                    coord: TileCoordinate::new(self.origin.x + x, self.origin.y + y),
                    dest_x: x * self.tile_size,
                    dest_y: y * self.tile_size,
                });
            }
        }
        cells
    }
}

/// タイルを集めてキャンバスを組み立てる
///
/// 1枚でも取得・検証に失敗したら組み立て全体を中止し、
/// 途中のキャンバスは破棄して失敗したタイル座標付きのエラーを返す。
pub struct CanvasAssembler<'a, S> {
    source: &'a S,
    cache: &'a TileCache,
    concurrency: usize,
    show_progress: bool,
}

impl<'a, S: TileSource> CanvasAssembler<'a, S> {
    pub fn new(source: &'a S, cache: &'a TileCache) -> Self {
        Self {
            source,
            cache,
            concurrency: 1,
            show_progress: false,
        }
    }

    /// 同時に取得するタイル数（1で逐次取得）
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn create_remote_image(&self, reference: &RgbaImage, anchor: &AnchorConfig) -> Result<RgbaImage> {
        let tile_size = self.source.tile_size();
        let grid = TileGrid::for_reference(anchor, reference.width(), reference.height(), tile_size)?;

        debug!(
            "キャンバス組み立て: 起点タイル {}, {}x{}タイル ({}x{}px)",
            grid.origin,
            grid.tiles_x,
            grid.tiles_y,
            grid.canvas_width(),
            grid.canvas_height()
        );

        let progress = self.progress_bar(grid.len() as u64);
        let result = self.fill_canvas(&grid, &progress).await;

        match &result {
            Ok(_) => progress.finish_and_clear(),
            Err(_) => progress.abandon(),
        }
        result
    }

    async fn fill_canvas(&self, grid: &TileGrid, progress: &ProgressBar) -> Result<RgbaImage> {
        let mut canvas = RgbaImage::new(grid.canvas_width(), grid.canvas_height());

        let source = self.source;
        let cache = self.cache;
        let mut tiles = stream::iter(grid.cells())
            .map(move |cell| async move {
                let tile = cache.get_or_fetch(source, cell.coord).await?;
                Ok::<_, CheckError>((cell, tile))
            })
            .buffer_unordered(self.concurrency);

        // 最初の失敗で return するとストリームごと未完了の取得も破棄される
        while let Some(fetched) = tiles.next().await {
            let (cell, tile) = fetched?;
            validate_tile(cell.coord, &tile, grid.tile_size)?;
            imageops::replace(&mut canvas, &tile, i64::from(cell.dest_x), i64::from(cell.dest_y));
            progress.inc(1);
        }

        Ok(canvas)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        let style = ProgressStyle::with_template("タイル取得 [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}
