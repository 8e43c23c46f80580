//! コマンドテスト
//!
//! 一時ディレクトリに config/ と projects/ を作り、メモリ上のタイルで各コマンドを実行

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use wplace_check::commands::check::{self, ProjectStatus};
use wplace_check::commands::color_check::{self, ColorCheckOutcome};
use wplace_check::commands::download::{self, DownloadRequest};
use wplace_check::commands::fix_string::{self, FixOutcome, FixRequest};
use wplace_check::config::Settings;
use wplace_check::error::{CheckError, Result};
use wplace_check::paths::Paths;
use wplace_check::raster::save_png;
use wplace_check::tiles::TileSource;
use wplace_check::Session;
use wplace_check_common::{ScanDirection, TileCoordinate};

const TILE_SIZE: u32 = 8;
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const COLORS_YAML: &str = r#"
"255,0,0":
  id: 4
  name: Red
"0,255,0":
  id: 6
  name: Green
  premium: true
"255,255,255":
  id: 5
  name: White
"#;

const PROFILES_YAML: &str = r#"
main:
  colors: "6, 7"
other:
  colors: [99]
"#;

/// すべてのタイルが白一色
struct BlankCanvas;

impl TileSource for BlankCanvas {
    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }

    async fn fetch_tile(&self, _coord: TileCoordinate) -> Result<RgbaImage> {
        Ok(RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, WHITE))
    }
}

fn write_project(root: &Path, name: &str, config: &str, image: Option<&RgbaImage>) {
    let dir = root.join("projects").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yaml"), config).unwrap();
    if let Some(image) = image {
        save_png(image, &dir.join("pixel.png")).unwrap();
    }
}

/// castle: 2x2 の赤（右下だけ緑）を (3,3) に配置
fn castle_image() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(2, 2, RED);
    image.put_pixel(1, 1, GREEN);
    image
}

fn setup() -> TempDir {
    let root = tempdir().expect("Failed to create temp dir");
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("colors.yaml"), COLORS_YAML).unwrap();
    fs::write(config_dir.join("profiles.yaml"), PROFILES_YAML).unwrap();

    let anchored = "tileX: 0\ntileY: 0\noffsetX: 3\noffsetY: 3\nimage: pixel.png\n";
    write_project(root.path(), "castle", anchored, Some(&castle_image()));
    write_project(root.path(), "done", anchored, Some(&RgbaImage::from_pixel(1, 1, WHITE)));
    write_project(
        root.path(),
        "paused",
        "tileX: 0\ntileY: 0\noffsetX: 0\noffsetY: 0\nimage: pixel.png\ndisableCheck: true\n",
        Some(&castle_image()),
    );
    write_project(root.path(), "_draft", anchored, Some(&castle_image()));
    write_project(root.path(), "broken", "tileX: 0\ntileY: -1\noffsetX: 0\noffsetY: 0\nimage: pixel.png\n", Some(&castle_image()));

    root
}

fn session(root: &TempDir) -> Session<BlankCanvas> {
    let settings = Settings {
        tile_size: TILE_SIZE,
        ..Default::default()
    };
    Session::with_source(Paths::new(root.path()), settings, BlankCanvas).unwrap()
}

fn request(profile: Option<&str>, direction: ScanDirection) -> FixRequest<'_> {
    FixRequest {
        project: "castle",
        pixel_count: 10,
        profile,
        direction,
    }
}

/// 全色のペイロード（上から走査）
#[tokio::test]
async fn test_fix_string_payload() {
    let root = setup();
    let session = session(&root);

    let outcome = fix_string::run(&session, &request(None, ScanDirection::Top)).await.unwrap();
    assert_eq!(
        outcome,
        FixOutcome::Payload(r#"{"colors":[4,4,4,6],"coords":[3,3,4,3,3,4,4,4]}"#.into())
    );

    let outcome = fix_string::run(&session, &request(None, ScanDirection::Bottom)).await.unwrap();
    assert_eq!(
        outcome,
        FixOutcome::Payload(r#"{"colors":[4,6,4,4],"coords":[3,4,4,4,3,3,4,3]}"#.into())
    );

    session.close();
}

/// プロファイルで色を絞り込む
#[tokio::test]
async fn test_fix_string_with_profile() {
    let root = setup();
    let session = session(&root);

    let outcome = fix_string::run(&session, &request(Some("main"), ScanDirection::Top)).await.unwrap();
    assert_eq!(outcome, FixOutcome::Payload(r#"{"colors":[6],"coords":[4,4]}"#.into()));

    let outcome = fix_string::run(&session, &request(Some("other"), ScanDirection::Top)).await.unwrap();
    assert_eq!(outcome, FixOutcome::NoAvailableColors);

    let err = fix_string::run(&session, &request(Some("missing"), ScanDirection::Top))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::ProfileNotFound(name) if name == "missing"));

    session.close();
}

/// 存在しないプロジェクト
#[tokio::test]
async fn test_fix_string_unknown_project() {
    let root = setup();
    let session = session(&root);

    let request = FixRequest {
        project: "nowhere",
        pixel_count: 5,
        profile: None,
        direction: ScanDirection::Top,
    };
    let err = fix_string::run(&session, &request).await.unwrap_err();
    assert!(matches!(err, CheckError::ProjectNotFound(_)));
}

/// 一致しているプロジェクトは差分なし
#[tokio::test]
async fn test_fix_string_no_differences() {
    let root = setup();
    let session = session(&root);

    let request = FixRequest {
        project: "done",
        pixel_count: 5,
        profile: None,
        direction: ScanDirection::Left,
    };
    let outcome = fix_string::run(&session, &request).await.unwrap();
    assert_eq!(outcome, FixOutcome::NoDifferences);
    assert_eq!(outcome.to_string(), "差分はありません");
}

/// check は1プロジェクトの失敗で止まらない
#[tokio::test]
async fn test_check_all_projects() {
    let root = setup();
    let session = session(&root);

    let summary = check::run(&session, &[], false).await.unwrap();

    let names: Vec<&str> = summary.checked.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["castle", "done", "paused"]);
    assert_eq!(summary.failed, vec!["broken".to_string()]);

    assert_eq!(summary.status("done"), Some(&ProjectStatus::Complete));
    assert_eq!(summary.status("paused"), Some(&ProjectStatus::Disabled));
    assert_eq!(summary.status("_draft"), None);

    match summary.status("castle") {
        Some(ProjectStatus::Incomplete(result)) => {
            assert_eq!(result.total_pixels, 4);
            assert_eq!(result.matching_pixels, 0);
            assert!(result.differences.is_empty());
        }
        other => panic!("unexpected status: {:?}", other),
    }

    // 同じ (0,0) タイルは1回だけキャッシュされる
    assert_eq!(session.cache().len(), 1);
    session.close();
}

/// 指定したプロジェクトだけ確認
#[tokio::test]
async fn test_check_filtered_projects() {
    let root = setup();
    let session = session(&root);

    let summary = check::run(&session, &["done".to_string()], false).await.unwrap();
    assert_eq!(summary.checked.len(), 1);
    assert!(summary.failed.is_empty());
}

/// color-check は色ごとの不足数とプロファイルを集計する
#[tokio::test]
async fn test_color_check_report() {
    let root = setup();
    let session = session(&root);

    let outcome = color_check::run(&session, "castle").await.unwrap();
    let ColorCheckOutcome::Report(report) = outcome else {
        panic!("report expected");
    };

    assert_eq!(report.missing_pixels, 4);
    assert_eq!(report.colors_without_profile, 0);
    assert_eq!(report.rows.len(), 2);

    assert_eq!(report.rows[0].color_id, 4);
    assert_eq!(report.rows[0].count, 3);
    assert_eq!(report.rows[0].profiles, vec!["free".to_string()]);

    assert_eq!(report.rows[1].color_id, 6);
    assert_eq!(report.rows[1].name, "Green");
    assert_eq!(report.rows[1].count, 1);
    assert_eq!(report.rows[1].profiles, vec!["main".to_string()]);

    let text = report.to_string();
    assert!(text.contains("Red (#4)"));
    assert!(text.contains("2 different colors"));
    assert!(!text.contains('\x1b'));
}

/// プロファイル設定がなくても color-check は動く
#[tokio::test]
async fn test_color_check_without_profiles() {
    let root = setup();
    fs::remove_file(root.path().join("config").join("profiles.yaml")).unwrap();
    let session = session(&root);

    let outcome = color_check::run(&session, "castle").await.unwrap();
    let ColorCheckOutcome::Report(report) = outcome else {
        panic!("report expected");
    };
    assert_eq!(report.colors_without_profile, 1);
    assert!(report.rows[1].profiles.is_empty());

    let outcome = color_check::run(&session, "done").await.unwrap();
    assert_eq!(outcome, ColorCheckOutcome::NoDifferences);
}

/// download-image は指定範囲を切り出して保存する
#[tokio::test]
async fn test_download_image() {
    let root = setup();
    let session = session(&root);
    let output = root.path().join("out.png");

    let request = DownloadRequest {
        tile_x: 4,
        tile_y: 9,
        pixel_x: 6,
        pixel_y: 2,
        width: 5,
        height: 3,
        output: Some(output.clone()),
    };
    let saved = download::run(&session, &request).await.unwrap();
    assert_eq!(saved, output);

    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (5, 3));
    assert!(image.pixels().all(|p| *p == WHITE));

    // 6 + 5 = 11px → 横2タイル
    assert_eq!(session.cache().len(), 2);
    session.close();
}

/// 幅0はエラー
#[tokio::test]
async fn test_download_image_zero_size() {
    let root = setup();
    let session = session(&root);

    let request = DownloadRequest {
        tile_x: 0,
        tile_y: 0,
        pixel_x: 0,
        pixel_y: 0,
        width: 0,
        height: 3,
        output: None,
    };
    let err = download::run(&session, &request).await.unwrap_err();
    assert!(matches!(err, CheckError::Config(_)));
}

/// u32 を超える範囲はタイル取得前に設定エラー
#[tokio::test]
async fn test_download_image_out_of_range() {
    let root = setup();
    let session = session(&root);

    let request = DownloadRequest {
        tile_x: 0,
        tile_y: 0,
        pixel_x: u32::MAX,
        pixel_y: 0,
        width: 1,
        height: 1,
        output: None,
    };
    let err = download::run(&session, &request).await.unwrap_err();
    assert!(matches!(err, CheckError::Config(_)));
    assert!(session.cache().is_empty());
}

/// 巨大なオフセットのプロジェクトは失敗扱いで、他のプロジェクトは確認される
#[tokio::test]
async fn test_check_project_offset_out_of_range() {
    let root = setup();
    write_project(
        root.path(),
        "huge",
        "tileX: 0\ntileY: 0\noffsetX: 4294967295\noffsetY: 0\nimage: pixel.png\n",
        Some(&castle_image()),
    );
    let session = session(&root);

    let summary = check::run(&session, &[], false).await.unwrap();
    assert!(summary.failed.contains(&"huge".to_string()));
    assert_eq!(summary.status("done"), Some(&ProjectStatus::Complete));
}

/// pushover.yaml が壊れていても通知なしで確認を続ける
#[tokio::test]
async fn test_check_with_malformed_pushover_config() {
    let root = setup();
    fs::write(root.path().join("config").join("pushover.yaml"), "token: [unclosed\n").unwrap();
    let session = session(&root);

    let summary = check::run(&session, &[], true).await.unwrap();
    assert!(matches!(summary.status("castle"), Some(ProjectStatus::Incomplete(_))));
    assert_eq!(summary.status("done"), Some(&ProjectStatus::Complete));
    assert_eq!(summary.failed, vec!["broken".to_string()]);
}
