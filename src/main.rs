use anyhow::Result;
use order_auto_register::orchestrator::App;
use order_auto_register::{utils, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    utils::logging::init(config.verbose_logging);

    // 初始化应用
    let app = App::initialize(config).await?;

    // Ctrl-C 时取消批次，当前阶段跑完后停下
    let cancel = app.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("⚠️ 收到中断信号，批次将在当前阶段后停止");
            cancel.cancel();
        }
    });

    app.run().await?;

    Ok(())
}
