use super::TileSource;
use crate::config::{build_tile_url, Settings};
use crate::error::{CheckError, Result};
use image::RgbaImage;
use log::debug;
use reqwest::header::ACCEPT;
use wplace_check_common::TileCoordinate;

/// HTTPタイル取得
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: reqwest::Client,
    url_template: String,
    tile_size: u32,
}

impl HttpTileSource {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| CheckError::Config(format!("HTTPクライアントを初期化できません: {}", e)))?;

        Ok(Self {
            client,
            url_template: settings.tile_url.clone(),
            tile_size: settings.tile_size,
        })
    }

    pub fn tile_url(&self, coord: TileCoordinate) -> String {
        build_tile_url(&self.url_template, coord)
    }
}

impl TileSource for HttpTileSource {
    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    async fn fetch_tile(&self, coord: TileCoordinate) -> Result<RgbaImage> {
        let url = self.tile_url(coord);
        debug!("タイル取得: {}", url);

        let unavailable = |reason: String| CheckError::TileUnavailable { coord, reason };

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "image/png")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        decode_tile(coord, &body, self.tile_size)
    }
}

/// レスポンスボディをデコードしてサイズを検証
pub fn decode_tile(coord: TileCoordinate, bytes: &[u8], tile_size: u32) -> Result<RgbaImage> {
    let tile = image::load_from_memory(bytes)
        .map_err(|e| CheckError::TileInvalid {
            coord,
            reason: format!("デコードできません: {}", e),
        })?
        .to_rgba8();

    validate_tile(coord, &tile, tile_size)?;
    Ok(tile)
}

/// タイルがちょうど tile_size × tile_size であることを確認
pub fn validate_tile(coord: TileCoordinate, tile: &RgbaImage, tile_size: u32) -> Result<()> {
    let (width, height) = tile.dimensions();
    if width != tile_size || height != tile_size {
        return Err(CheckError::TileInvalid {
            coord,
            reason: format!(
                "サイズが不正です: {}x{}（期待値 {}x{}）",
                width, height, tile_size, tile_size
            ),
        });
    }
    Ok(())
}
