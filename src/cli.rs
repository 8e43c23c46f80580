use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use wplace_check_common::ScanDirection;

#[derive(Parser)]
#[command(name = "wplace-check")]
#[command(about = "wplaceキャンバス上のピクセルアート照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ルートディレクトリ（config/ と projects/ を含む）
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// タイル取得の並列数（settings.yaml より優先）
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// projects/ 配下の作品を確認
    Check {
        /// 対象プロジェクト（省略時は全プロジェクト）
        projects: Vec<String>,

        /// Pushover通知を送る (true/false)
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        push: bool,
    },

    /// 修正用ペイロード（色IDと座標）を出力
    FixString {
        /// プロジェクト名
        #[arg(required = true)]
        project: String,

        /// 出力するピクセル数
        #[arg(required = true)]
        pixelcount: usize,

        /// 利用可能な色を絞り込むプロファイル
        profile: Option<String>,

        /// 走査方向 (top/bottom/left/right)
        #[arg(short, long, default_value = "top")]
        direction: ScanDirection,
    },

    /// 不足している色を集計
    ColorCheck {
        /// プロジェクト名
        #[arg(required = true)]
        project: String,
    },

    /// タイルから画像を切り出して保存
    DownloadImage {
        /// 起点タイルX
        tile_x: u32,
        /// 起点タイルY
        tile_y: u32,
        /// タイル内の開始ピクセルX
        pixel_x: u32,
        /// タイル内の開始ピクセルY
        pixel_y: u32,
        /// 幅
        width: u32,
        /// 高さ
        height: u32,

        /// 出力ファイル（省略時は downloaded_image_<日時>.png）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
