use clap::Parser;
use log::info;

use humangl::app::{self, HeadlessOptions};
use humangl::cli::Cli;
use humangl::config::{JsonConfig, parse_json};
use humangl::error::Error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG 优先，其次按 -v / -q 决定默认级别
    let default_level = match (cli.verbose, cli.quiet) {
        (0, true) => "error",
        (0, false) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match &cli.config {
        Some(path) => parse_json(path)?,
        None => JsonConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    if !cli.fps_is_valid() {
        return Err(Error::InvalidArgument(format!("帧率必须为正数: {}", cli.fps)).into());
    }
    info!("初始化完成");

    if cli.headless {
        let options = HeadlessOptions {
            frames: cli.frames,
            fps: cli.fps,
            out_dir: cli.out.clone(),
            mode: cli.mode,
        };
        app::run_headless(&config, &options)?;
    } else {
        app::run_window(&config, cli.mode)?;
    }

    Ok(())
}
