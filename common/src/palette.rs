//! パレット（色カタログ）とプロファイル
//!
//! colors.yaml は `"r,g,b"` をキーに `{id, name, premium}` を持つ。
//! profiles.yaml はプロファイル名をキーに利用可能な色IDの一覧を持つ。
//! ここではパース済みのレコードからルックアップ用の構造を組み立てるだけで、
//! ファイル読み込みは呼び出し側で行う。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// RGB値（パレットのルックアップキー）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    /// `#rrggbb` 形式
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// `"r,g,b"` 形式のキーをパース
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(Error::Palette(format!("不正なRGBキー: {}", s)));
        }

        let mut channels = [0u8; 3];
        for (channel, part) in channels.iter_mut().zip(&parts) {
            *channel = part
                .parse()
                .map_err(|_| Error::Palette(format!("不正なRGBキー: {}", s)))?;
        }

        Ok(Self(channels))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0[0], self.0[1], self.0[2])
    }
}

/// colors.yaml の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub premium: bool,
}

/// パレットエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub id: u32,
    pub name: String,
    pub premium: bool,
    pub rgb: Rgb,
}

/// 色カタログ: RGB完全一致 → 色ID
#[derive(Debug, Clone, Default)]
pub struct PaletteCatalog {
    by_rgb: HashMap<Rgb, PaletteEntry>,
    by_id: HashMap<u32, Rgb>,
}

impl PaletteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"r,g,b"` キー付きのレコードからカタログを構築
    pub fn from_records<I, K>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ColorRecord)>,
        K: AsRef<str>,
    {
        let mut catalog = Self::new();
        for (key, record) in records {
            let rgb: Rgb = key.as_ref().parse()?;
            catalog.insert(rgb, record)?;
        }
        Ok(catalog)
    }

    /// エントリを追加（同じIDが別のRGBに割り当て済みならエラー）
    pub fn insert(&mut self, rgb: Rgb, record: ColorRecord) -> Result<()> {
        if let Some(existing) = self.by_id.get(&record.id) {
            if *existing != rgb {
                return Err(Error::Palette(format!(
                    "色ID {} が重複しています: {} / {}",
                    record.id, existing, rgb
                )));
            }
        }

        if let Some(previous) = self.by_rgb.get(&rgb) {
            self.by_id.remove(&previous.id);
        }

        self.by_id.insert(record.id, rgb);
        self.by_rgb.insert(
            rgb,
            PaletteEntry {
                id: record.id,
                name: record.name,
                premium: record.premium,
                rgb,
            },
        );
        Ok(())
    }

    /// RGB完全一致でエントリを取得
    pub fn resolve(&self, rgb: Rgb) -> Option<&PaletteEntry> {
        self.by_rgb.get(&rgb)
    }

    pub fn color_id(&self, rgb: Rgb) -> Option<u32> {
        self.resolve(rgb).map(|e| e.id)
    }

    /// 色IDでエントリを取得
    pub fn get(&self, id: u32) -> Option<&PaletteEntry> {
        self.by_id.get(&id).and_then(|rgb| self.by_rgb.get(rgb))
    }

    pub fn len(&self) -> usize {
        self.by_rgb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_rgb.is_empty()
    }
}

/// プロファイルの色ID一覧
///
/// YAMLでは `"1,2,3"` の文字列、配列、単一の数値のいずれでも書ける。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorList {
    Ids(Vec<u32>),
    Single(u32),
    Text(String),
}

impl ColorList {
    pub fn to_ids(&self) -> Result<BTreeSet<u32>> {
        match self {
            ColorList::Ids(ids) => Ok(ids.iter().copied().collect()),
            ColorList::Single(id) => Ok(BTreeSet::from([*id])),
            ColorList::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u32>()
                        .map_err(|_| Error::Profile(format!("不正な色ID: {}", s)))
                })
                .collect(),
        }
    }
}

/// profiles.yaml の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub colors: ColorList,
}

/// プロファイル名 → 利用可能な色ID
#[derive(Debug, Clone, Default)]
pub struct Profiles {
    profiles: BTreeMap<String, BTreeSet<u32>>,
}

impl Profiles {
    pub fn from_records<I, K>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ProfileRecord)>,
        K: Into<String>,
    {
        let mut profiles = BTreeMap::new();
        for (name, record) in records {
            let name = name.into();
            let ids = record
                .colors
                .to_ids()
                .map_err(|e| Error::Profile(format!("{}: {}", name, e)))?;
            profiles.insert(name, ids);
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<u32>> {
        self.profiles.get(name)
    }

    /// 指定した色IDを含むプロファイル名（名前順）
    pub fn profiles_containing(&self, color_id: u32) -> Vec<&str> {
        self.profiles
            .iter()
            .filter(|(_, ids)| ids.contains(&color_id))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
