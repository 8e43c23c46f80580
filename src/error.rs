use thiserror::Error;
use wplace_check_common::TileCoordinate;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("プロジェクトが見つかりません: {0}")]
    ProjectNotFound(String),

    #[error("プロファイルが見つかりません: {0}")]
    ProfileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    /// 通信エラー・タイムアウト・非2xxレスポンス
    #[error("タイルを取得できません {coord}: {reason}")]
    TileUnavailable { coord: TileCoordinate, reason: String },

    /// デコード不可、またはタイルサイズ不一致
    #[error("タイルが不正です {coord}: {reason}")]
    TileInvalid { coord: TileCoordinate, reason: String },

    #[error("通知エラー: {0}")]
    Notify(String),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("YAML解析エラー: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] wplace_check_common::Error),
}

impl CheckError {
    /// タイル取得系エラーの対象座標
    pub fn tile_coordinate(&self) -> Option<TileCoordinate> {
        match self {
            CheckError::TileUnavailable { coord, .. } | CheckError::TileInvalid { coord, .. } => {
                Some(*coord)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
