use crate::error::{CheckError, Result};
use crate::paths::Paths;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wplace_check_common::{AnchorConfig, ColorRecord, PaletteCatalog, ProfileRecord, Profiles, TileCoordinate};

pub const DEFAULT_TILE_URL: &str = "https://backend.wplace.live/files/s0/tiles/{X}/{Y}.png";
pub const DEFAULT_TILE_SIZE: u32 = 1000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// 実行設定（config/settings.yaml、なければデフォルト）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tile_url: String,
    pub tile_size: u32,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// タイル取得の並列数
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_url: DEFAULT_TILE_URL.into(),
            tile_size: DEFAULT_TILE_SIZE,
            timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.into(),
            concurrency: 4,
        }
    }
}

impl Settings {
    pub fn load(paths: &Paths) -> Result<Self> {
        let settings_path = paths.settings();

        let settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_yaml::from_str::<Settings>(&content)?
        } else {
            Self::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(CheckError::Config("tile_size は1以上にしてください".into()));
        }
        if self.concurrency == 0 {
            return Err(CheckError::Config("concurrency は1以上にしてください".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(CheckError::Config("timeout_seconds は1以上にしてください".into()));
        }
        if !self.tile_url.contains("{X}") || !self.tile_url.contains("{Y}") {
            return Err(CheckError::Config(format!(
                "tile_url に {{X}} と {{Y}} が必要です: {}",
                self.tile_url
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// URLテンプレートの `{X}` `{Y}` をタイル座標で置換
pub fn build_tile_url(template: &str, coord: TileCoordinate) -> String {
    template
        .replace("{X}", &coord.x.to_string())
        .replace("{Y}", &coord.y.to_string())
}

/// projects/<name>/config.yaml の生データ
///
/// 必須キーの欠落と負の値を個別のメッセージで報告するため、
/// いったん Option<i64> で受ける。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProjectConfig {
    tile_x: Option<i64>,
    tile_y: Option<i64>,
    offset_x: Option<i64>,
    offset_y: Option<i64>,
    image: Option<String>,
    #[serde(default)]
    disable_check: bool,
}

/// プロジェクト設定
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub anchor: AnchorConfig,
    /// 参照画像の絶対パス
    pub image: PathBuf,
    pub disable_check: bool,
}

impl ProjectConfig {
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = Paths::project_config(project_dir);

        if !config_path.exists() {
            return Err(CheckError::FileNotFound(config_path.display().to_string()));
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content, project_dir, &config_path)
    }

    fn parse(content: &str, project_dir: &Path, config_path: &Path) -> Result<Self> {
        let raw: Option<RawProjectConfig> = serde_yaml::from_str(content).map_err(|e| {
            CheckError::Config(format!("設定ファイルを解析できません {}: {}", config_path.display(), e))
        })?;
        let raw = raw.ok_or_else(|| {
            CheckError::Config(format!("設定ファイルが空です: {}", config_path.display()))
        })?;

        let anchor = AnchorConfig {
            tile_x: require_non_negative(raw.tile_x, "tileX", config_path)?,
            tile_y: require_non_negative(raw.tile_y, "tileY", config_path)?,
            offset_x: require_non_negative(raw.offset_x, "offsetX", config_path)?,
            offset_y: require_non_negative(raw.offset_y, "offsetY", config_path)?,
        };

        let image_name = raw.image.ok_or_else(|| {
            CheckError::Config(format!("'image' がありません: {}", config_path.display()))
        })?;
        let image = project_dir.join(image_name);
        if !image.exists() {
            return Err(CheckError::FileNotFound(image.display().to_string()));
        }

        Ok(Self {
            anchor,
            image,
            disable_check: raw.disable_check,
        })
    }
}

fn require_non_negative(value: Option<i64>, key: &str, config_path: &Path) -> Result<u32> {
    let value = value.ok_or_else(|| {
        CheckError::Config(format!("'{}' がありません: {}", key, config_path.display()))
    })?;

    u32::try_from(value).map_err(|_| {
        CheckError::Config(format!(
            "'{}' は0以上の整数にしてください ({}): {}",
            key,
            value,
            config_path.display()
        ))
    })
}

/// Pushover設定（config/pushover.yaml）
#[derive(Debug, Clone, Deserialize)]
pub struct PushoverConfig {
    pub token: String,
    pub user: String,
}

impl PushoverConfig {
    /// ファイルがなければ None（通知なし）
    pub fn load(paths: &Paths) -> Result<Option<Self>> {
        let path = paths.pushover();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let config: PushoverConfig = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }
}

/// 色カタログ（config/colors.yaml）を読み込み
pub fn load_palette(paths: &Paths) -> Result<PaletteCatalog> {
    let path = paths.colors();
    if !path.exists() {
        return Err(CheckError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(&path)?;
    let records: HashMap<String, ColorRecord> = serde_yaml::from_str(&content)?;
    Ok(PaletteCatalog::from_records(records)?)
}

/// プロファイル（config/profiles.yaml）を読み込み
pub fn load_profiles(paths: &Paths) -> Result<Profiles> {
    let path = paths.profiles();
    if !path.exists() {
        return Err(CheckError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(&path)?;
    let records: HashMap<String, ProfileRecord> = serde_yaml::from_str(&content)?;
    Ok(Profiles::from_records(records)?)
}
