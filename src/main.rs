use anyhow::{Context, Result};
use quiz_chain::utils::logging;
use quiz_chain::{App, ChainStatus, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(&config.log_filter);
    logging::log_startup(&config);

    // 起始 URL：命令行参数优先，其次是配置
    let start_url = std::env::args()
        .nth(1)
        .or_else(|| config.start_url.clone())
        .context("缺少起始 URL：请作为第一个参数传入，或设置 QUIZ_START_URL")?;

    let email = config.email.clone();
    let secret = config.secret.clone();
    let app = App::new(config);
    let report = app.run_chain(&email, &secret, &start_url).await?;

    logging::log_chain_summary(&report);

    if report.status != ChainStatus::Done {
        std::process::exit(1);
    }
    Ok(())
}
