use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        env_filter("doorbel_reports=debug,info")
    } else {
        env_filter("doorbel_reports=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub fn init_json_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("doorbel_reports=info"))
        .with_target(true) // 排程日誌進收集系統，留 target 方便依模組過濾
        .json()
        .init();
}
