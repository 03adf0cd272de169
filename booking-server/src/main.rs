use booking_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 读取 .env 并加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 2. 设置环境 (工作目录, 日志)
    setup_environment(&config)?;

    print_banner();

    tracing::info!(
        environment = %config.environment,
        timezone = %config.timezone.name(),
        port = config.http_port,
        "Booking server starting..."
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config)?;

    // 4. 启动 HTTP 服务器 (Server::run 会自动启动后台任务)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
