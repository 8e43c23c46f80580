//! download-image: タイルから任意の矩形を切り出してPNG保存

use crate::error::{CheckError, Result};
use crate::raster::{crop_region, save_png, transparent_image};
use crate::session::Session;
use crate::tiles::TileSource;
use chrono::Local;
use log::info;
use std::path::PathBuf;
use wplace_check_common::AnchorConfig;

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub tile_x: u32,
    pub tile_y: u32,
    /// 起点タイル内の開始ピクセル
    pub pixel_x: u32,
    pub pixel_y: u32,
    pub width: u32,
    pub height: u32,
    pub output: Option<PathBuf>,
}

pub async fn run<S: TileSource>(session: &Session<S>, request: &DownloadRequest) -> Result<PathBuf> {
    if request.width == 0 || request.height == 0 {
        return Err(CheckError::Config("width と height は1以上にしてください".into()));
    }

    info!(
        "タイル ({}, {}) のピクセル ({}, {}) から {}x{} をダウンロード",
        request.tile_x, request.tile_y, request.pixel_x, request.pixel_y, request.width, request.height
    );

    let anchor = AnchorConfig::new(request.tile_x, request.tile_y, request.pixel_x, request.pixel_y);

    // 必要な範囲を覆うためだけの透明な参照画像
    let placeholder = transparent_image(request.width, request.height);
    let canvas = session.remote_canvas(&placeholder, &anchor).await?;

    let cropped = crop_region(&canvas, request.pixel_x, request.pixel_y, request.width, request.height);

    let output = request.output.clone().unwrap_or_else(|| {
        let file_name = format!("downloaded_image_{}.png", Local::now().format("%Y-%m-%d_%H-%M-%S"));
        session.paths().output(&file_name)
    });

    save_png(&cropped, &output)?;
    info!("保存しました: {}", output.display());

    Ok(output)
}
