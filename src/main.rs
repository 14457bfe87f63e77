use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use havamath_extractor::utils::logging;
use havamath_extractor::{App, Cli, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 加载配置：默认值 < 配置文件 < 环境变量 < 命令行
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ 加载配置失败: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // 初始化日志
    logging::init(&config);

    tokio::select! {
        result = run(cli, config) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("❌ 运行失败: {:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("⚠️ 收到中断信号，程序退出");
            ExitCode::from(130)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("读取配置文件 {} 失败", path.display()))?,
        None => Config::default(),
    };
    let config = base.with_env().context("解析环境变量失败")?;
    Ok(cli.apply(config))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let input = cli.input().context("必须指定 --url 或 --json")?;

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    let result = app.run(input, cli.output.clone()).await;
    app.shutdown().await;

    let path = result?;
    info!("✅ 完成: {}", path.display());
    Ok(())
}
