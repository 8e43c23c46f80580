use clap::Parser;
use log::{error, info, LevelFilter};
use std::io::IsTerminal;
use std::process::ExitCode;
use wplace_check::commands::{check, color_check, download, fix_string};
use wplace_check::{cli, error, paths, session};
use cli::{Cli, Commands};
use color_check::ColorCheckOutcome;
use error::Result;
use fix_string::FixOutcome;
use paths::Paths;
use session::Session;

fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let session = match Session::open(Paths::new(&cli.root)) {
        Ok(session) => session
            .with_concurrency(cli.concurrency)
            .with_progress(std::io::stderr().is_terminal()),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // 成功・失敗どちらでもキャッシュは close で削除する
    let outcome = run(&session, cli.command).await;
    session.close();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Check { projects, push } => {
            let summary = check::run(session, &projects, push).await?;
            if !summary.failed.is_empty() {
                info!("失敗したプロジェクト: {}", summary.failed.join(", "));
            }
        }

        Commands::FixString { project, pixelcount, profile, direction } => {
            let request = fix_string::FixRequest {
                project: &project,
                pixel_count: pixelcount,
                profile: profile.as_deref(),
                direction,
            };

            match fix_string::run(session, &request).await? {
                FixOutcome::Payload(json) => {
                    println!();
                    println!("{}", json);
                }
                other => info!("{}", other),
            }
        }

        Commands::ColorCheck { project } => match color_check::run(session, &project).await? {
            ColorCheckOutcome::NoDifferences => info!("差分はありません"),
            ColorCheckOutcome::Report(report) => {
                println!();
                println!("{}", report.with_color(std::io::stdout().is_terminal()));
            }
        },

        Commands::DownloadImage { tile_x, tile_y, pixel_x, pixel_y, width, height, output } => {
            let request = download::DownloadRequest {
                tile_x,
                tile_y,
                pixel_x,
                pixel_y,
                width,
                height,
                output,
            };
            download::run(session, &request).await?;
        }
    }

    Ok(())
}
