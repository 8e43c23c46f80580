//! 座標・設定の型定義
//!
//! - TileCoordinate: リモートキャンバスのタイルグリッド上の位置
//! - AnchorConfig: 参照画像をタイルグリッドのどこに置くか
//! - ScanDirection: 照合時の走査順

use serde::{Deserialize, Serialize};
use std::fmt;

/// タイル座標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoordinate {
    pub x: u32,
    pub y: u32,
}

impl TileCoordinate {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// キャッシュファイル名用のキー（`x_y`）
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.x, self.y)
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// アンカー設定
///
/// `tile_x`/`tile_y` は参照画像を含む左上タイル、`offset_x`/`offset_y` は
/// そのタイル内での参照画像左上のピクセル位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorConfig {
    pub tile_x: u32,
    pub tile_y: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl AnchorConfig {
    pub const fn new(tile_x: u32, tile_y: u32, offset_x: u32, offset_y: u32) -> Self {
        Self {
            tile_x,
            tile_y,
            offset_x,
            offset_y,
        }
    }

    /// 左上タイルの座標
    pub fn origin_tile(&self) -> TileCoordinate {
        TileCoordinate::new(self.tile_x, self.tile_y)
    }
}

/// 照合時の走査方向
///
/// 差分リストに上限がある場合、どのピクセルが記録されるかと
/// その並び順だけが変わる。集計値は走査方向に依存しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanDirection {
    /// 上の行から（y昇順、行内はx昇順）
    #[default]
    Top,
    /// 下の行から（y降順、行内はx昇順）
    Bottom,
    /// 左の列から（x昇順、列内はy昇順）
    Left,
    /// 右の列から（x降順、列内はy昇順）
    Right,
}

impl ScanDirection {
    /// 外側ループが列（x）かどうか
    pub fn is_column_major(&self) -> bool {
        matches!(self, ScanDirection::Left | ScanDirection::Right)
    }

    /// 外側ループが降順かどうか
    pub fn is_reversed(&self) -> bool {
        matches!(self, ScanDirection::Bottom | ScanDirection::Right)
    }
}

impl std::str::FromStr for ScanDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" | "t" => Ok(ScanDirection::Top),
            "bottom" | "b" => Ok(ScanDirection::Bottom),
            "left" | "l" => Ok(ScanDirection::Left),
            "right" | "r" => Ok(ScanDirection::Right),
            _ => Err(format!("Unknown direction: {}. Use top, bottom, left, or right", s)),
        }
    }
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanDirection::Top => write!(f, "top"),
            ScanDirection::Bottom => write!(f, "bottom"),
            ScanDirection::Left => write!(f, "left"),
            ScanDirection::Right => write!(f, "right"),
        }
    }
}
