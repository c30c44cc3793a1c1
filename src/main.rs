use clap::Parser;
use doorbel_reports::domain::model::Collection;
use doorbel_reports::utils::{logger, validation::Validate};
use doorbel_reports::{CliConfig, ExportPipeline, LocalStorage, ReportEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting doorbel-reports CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 憑證只在這裡注入，核心邏輯不碰環境變數
    config.resolve_token_from_env();

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let collection = match Collection::parse(&config.collection) {
        Some(collection) => collection,
        None => {
            // validate() 已擋下，這裡只是保險
            eprintln!("❌ Unknown collection: {}", config.collection);
            std::process::exit(1);
        }
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ExportPipeline::new(storage, config, collection);

    // 創建報表引擎並運行
    let engine = ReportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Export completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                doorbel_reports::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                doorbel_reports::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                doorbel_reports::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                doorbel_reports::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
