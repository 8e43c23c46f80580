//! タイル取得テスト
//!
//! ローカルHTTPサーバーに対してタイル取得・キャッシュ・組み立てを検証

use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wplace_check::config::Settings;
use wplace_check::error::CheckError;
use wplace_check::paths::Paths;
use wplace_check::raster::encode_png;
use wplace_check::tiles::{HttpTileSource, TileSource};
use wplace_check::Session;
use wplace_check_common::{AnchorConfig, TileCoordinate};

const TILE_SIZE: u32 = 4;

type Routes = HashMap<String, (u16, Vec<u8>)>;

/// パスごとの応答を返し、リクエスト回数を記録するだけのHTTPサーバー
struct TileServer {
    addr: SocketAddr,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl TileServer {
    async fn start(routes: Routes) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let routes = Arc::new(routes);

        let server_hits = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let hits = server_hits.clone();

                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&chunk[..n]);
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

                    let (status, body) = routes
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, b"not found".to_vec()));
                    let reason = if status == 200 { "OK" } else { "Error" };
                    let header = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        reason,
                        body.len()
                    );

                    let _ = socket.write_all(header.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, hits }
    }

    fn settings(&self) -> Settings {
        Settings {
            tile_url: format!("http://{}/tiles/{{X}}/{{Y}}.png", self.addr),
            tile_size: TILE_SIZE,
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

fn tile_png(color: Rgba<u8>) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, color)).unwrap()
}

fn route(routes: &mut Routes, x: u32, y: u32, status: u16, body: Vec<u8>) {
    routes.insert(format!("/tiles/{}/{}.png", x, y), (status, body));
}

/// 正常なタイルの取得とデコード
#[tokio::test]
async fn test_fetch_tile_success() {
    let mut routes = Routes::new();
    route(&mut routes, 10, 20, 200, tile_png(Rgba([1, 2, 3, 255])));
    let server = TileServer::start(routes).await;

    let source = HttpTileSource::new(&server.settings()).unwrap();
    let tile = source.fetch_tile(TileCoordinate::new(10, 20)).await.unwrap();

    assert_eq!(tile.dimensions(), (TILE_SIZE, TILE_SIZE));
    assert_eq!(tile.get_pixel(3, 3), &Rgba([1, 2, 3, 255]));
}

/// 非2xxはタイル取得不可
#[tokio::test]
async fn test_fetch_tile_not_found() {
    let server = TileServer::start(Routes::new()).await;
    let source = HttpTileSource::new(&server.settings()).unwrap();

    let err = source.fetch_tile(TileCoordinate::new(7, 8)).await.unwrap_err();
    assert!(matches!(err, CheckError::TileUnavailable { .. }));
    assert_eq!(err.tile_coordinate(), Some(TileCoordinate::new(7, 8)));
}

/// デコードできない本文は不正タイル
#[tokio::test]
async fn test_fetch_tile_garbage_body() {
    let mut routes = Routes::new();
    route(&mut routes, 0, 0, 200, b"<html>rate limited</html>".to_vec());
    let server = TileServer::start(routes).await;

    let source = HttpTileSource::new(&server.settings()).unwrap();
    let err = source.fetch_tile(TileCoordinate::new(0, 0)).await.unwrap_err();
    assert!(matches!(err, CheckError::TileInvalid { .. }));
}

/// サイズ違いのタイルは不正タイル
#[tokio::test]
async fn test_fetch_tile_wrong_size() {
    let small = encode_png(&RgbaImage::from_pixel(TILE_SIZE / 2, TILE_SIZE / 2, Rgba([0, 0, 0, 255]))).unwrap();
    let mut routes = Routes::new();
    route(&mut routes, 3, 3, 200, small);
    let server = TileServer::start(routes).await;

    let source = HttpTileSource::new(&server.settings()).unwrap();
    let err = source.fetch_tile(TileCoordinate::new(3, 3)).await.unwrap_err();
    assert!(matches!(err, CheckError::TileInvalid { coord, .. } if coord == TileCoordinate::new(3, 3)));
}

/// 組み立ては同じタイルを1回だけダウンロードし、close でキャッシュが消える
#[tokio::test]
async fn test_session_downloads_each_tile_once() {
    let mut routes = Routes::new();
    route(&mut routes, 100, 200, 200, tile_png(Rgba([255, 0, 0, 255])));
    route(&mut routes, 100, 201, 200, tile_png(Rgba([0, 255, 0, 255])));
    route(&mut routes, 101, 200, 200, tile_png(Rgba([0, 0, 255, 255])));
    route(&mut routes, 101, 201, 200, tile_png(Rgba([9, 9, 9, 255])));
    let server = TileServer::start(routes).await;

    let root = tempdir().expect("Failed to create temp dir");
    let settings = server.settings();
    let source = HttpTileSource::new(&settings).unwrap();
    let session = Session::with_source(Paths::new(root.path()), settings, source)
        .unwrap()
        .with_concurrency(Some(2));

    // offset 2 + 幅 5 → 2x2タイル
    let anchor = AnchorConfig::new(100, 200, 2, 2);
    let reference = RgbaImage::new(5, 5);

    let first = session.remote_canvas(&reference, &anchor).await.unwrap();
    let second = session.remote_canvas(&reference, &anchor).await.unwrap();

    assert_eq!(first.dimensions(), (8, 8));
    assert_eq!(first, second);
    assert_eq!(first.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(first.get_pixel(0, 4), &Rgba([0, 255, 0, 255]));
    assert_eq!(first.get_pixel(4, 0), &Rgba([0, 0, 255, 255]));
    assert_eq!(first.get_pixel(7, 7), &Rgba([9, 9, 9, 255]));

    for path in [
        "/tiles/100/200.png",
        "/tiles/100/201.png",
        "/tiles/101/200.png",
        "/tiles/101/201.png",
    ] {
        assert_eq!(server.hits(path), 1, "{}", path);
    }

    assert_eq!(session.cache().len(), 4);
    let cache_dir = session.cache().dir().to_path_buf();
    assert!(cache_dir.exists());

    session.close();
    assert!(!cache_dir.exists());
}

/// 1枚でも取得できなければ組み立て全体が失敗する
#[tokio::test]
async fn test_session_fails_on_missing_tile() {
    let mut routes = Routes::new();
    route(&mut routes, 0, 0, 200, tile_png(Rgba([255, 0, 0, 255])));
    route(&mut routes, 1, 0, 500, Vec::new());
    let server = TileServer::start(routes).await;

    let root = tempdir().expect("Failed to create temp dir");
    let settings = server.settings();
    let source = HttpTileSource::new(&settings).unwrap();
    let session = Session::with_source(Paths::new(root.path()), settings, source).unwrap();

    let anchor = AnchorConfig::new(0, 0, 0, 0);
    let reference = RgbaImage::new(TILE_SIZE * 2, TILE_SIZE);

    let err = session.remote_canvas(&reference, &anchor).await.unwrap_err();
    assert!(matches!(err, CheckError::TileUnavailable { .. }));
    assert_eq!(err.tile_coordinate(), Some(TileCoordinate::new(1, 0)));

    session.close();
}
