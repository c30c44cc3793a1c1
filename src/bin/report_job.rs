use clap::Parser;
use doorbel_reports::config::toml_config::ReportConfig;
use doorbel_reports::core::campaign::{run_campaign, HttpBulkSender};
use doorbel_reports::core::pipeline::ExportPipeline;
use doorbel_reports::core::stats::{waitlist_summary, WaitlistSummary};
use doorbel_reports::core::{ConfigProvider, Pipeline};
use doorbel_reports::domain::model::{CampaignOutcome, Collection, Record};
use doorbel_reports::utils::validation::validate_required_field;
use doorbel_reports::utils::{logger, validation::Validate};
use doorbel_reports::{LocalStorage, ReportEngine, ReportError};

#[derive(Parser)]
#[command(name = "report-job")]
#[command(about = "Run a TOML-defined DoorBel report job: exports, stats and campaigns")]
struct Args {
    /// Path to TOML job file
    #[arg(short, long, default_value = "report-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON logs (for scheduled runs)
    #[arg(long)]
    log_json: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be exported without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Print a waitlist statistics summary after the exports
    #[arg(long)]
    stats: bool,

    /// Actually trigger the campaign blast (otherwise only previewed)
    #[arg(long)]
    send: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting DoorBel report job");
    tracing::info!("📁 Loading job file: {}", args.config);

    // 載入 TOML 配置
    let config = match ReportConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load job file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Job file loaded and validated successfully");

    let collections = config.collections()?;
    display_job_summary(&config, &collections, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be made");
        perform_dry_run(&config, &collections);
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 逐一匯出各 collection
    for collection in &collections {
        if let Err(e) = run_export(&config, *collection, monitor_enabled).await {
            match e {
                // 空資料集是通知，任務繼續跑下一個 collection
                ReportError::EmptyDataset => {
                    tracing::warn!("📭 No {} data to export today", collection);
                    println!("📭 No {} data to export today", collection);
                }
                e => {
                    report_failure(&e);
                    std::process::exit(exit_code_for(&e));
                }
            }
        }
    }

    // 統計與行銷活動共用同一批 waitlist 記錄
    let needs_waitlist = args.stats || config.campaign.is_some();
    if needs_waitlist {
        let waitlist = fetch_waitlist(&config).await?;

        if args.stats {
            let summary = waitlist_summary(&waitlist);
            display_waitlist_summary(&summary);
        }

        if let Some(campaign) = &config.campaign {
            let audience_size = campaign.audience.audience_size(&waitlist);
            println!(
                "🎯 Campaign audience: {} of {} waitlist users",
                audience_size,
                waitlist.len()
            );

            if args.send {
                let endpoint =
                    validate_required_field("campaign.notify_endpoint", &campaign.notify_endpoint)?;
                let sender = HttpBulkSender::new(
                    endpoint.clone(),
                    config.api_token().map(str::to_string),
                    config.request_timeout_seconds(),
                );

                match run_campaign(&sender, &waitlist, &campaign.audience, &campaign.message)
                    .await?
                {
                    CampaignOutcome::NoRecipients => {
                        println!("📭 No recipients match the target audience - nothing sent");
                    }
                    CampaignOutcome::Sent(result) => {
                        println!(
                            "📨 Campaign sent: {}/{} delivered, {} failed",
                            result.sent, result.total, result.failed
                        );
                    }
                }
            } else {
                println!("ℹ️ Pass --send to actually trigger the campaign blast");
            }
        }
    }

    tracing::info!("✅ Report job finished");
    Ok(())
}

async fn run_export(
    config: &ReportConfig,
    collection: Collection,
    monitor_enabled: bool,
) -> doorbel_reports::Result<String> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let mut pipeline = ExportPipeline::new(storage, config.clone(), collection);

    if let Some(columns) = config.custom_columns() {
        tracing::info!("🔧 Using {} custom columns from the job file", columns.len());
        pipeline = pipeline.with_columns(columns);
    }

    let engine = ReportEngine::new_with_monitoring(pipeline, monitor_enabled);
    let output_path = engine.run().await?;
    println!("✅ {} export saved to: {}", collection, output_path);
    Ok(output_path)
}

/// 行銷對象直接抓 waitlist collection 的原始記錄
async fn fetch_waitlist(config: &ReportConfig) -> doorbel_reports::Result<Vec<Record>> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ExportPipeline::new(storage, config.clone(), Collection::Waitlist);
    pipeline.extract().await
}

fn report_failure(e: &ReportError) {
    tracing::error!(
        "❌ Report job failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
}

fn exit_code_for(e: &ReportError) -> i32 {
    match e.severity() {
        doorbel_reports::utils::error::ErrorSeverity::Low => 0,
        doorbel_reports::utils::error::ErrorSeverity::Medium => 2,
        doorbel_reports::utils::error::ErrorSeverity::High => 1,
        doorbel_reports::utils::error::ErrorSeverity::Critical => 3,
    }
}

fn display_job_summary(config: &ReportConfig, collections: &[Collection], args: &Args) {
    println!("📋 Job Summary:");
    println!(
        "  Job: {} v{}",
        config.job.name,
        config.job.version.as_deref().unwrap_or("0.1.0")
    );
    println!("  API: {}", config.api_base_url());
    println!("  Output: {}", config.output_path());
    println!(
        "  Collections: {}",
        collections
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Page size: {}", config.page_size());

    if let Some(max_records) = config.max_records() {
        println!("  Max records: {}", max_records);
    }

    if config.campaign.is_some() {
        println!("  Campaign: configured{}", if args.send { " (WILL SEND)" } else { " (preview only)" });
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &ReportConfig, collections: &[Collection]) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Data Source:");
    println!("  Base URL: {}", config.api_base_url());
    println!(
        "  Auth: {}",
        if config.api_token().is_some() {
            "bearer token"
        } else {
            "none"
        }
    );
    println!("  Timeout: {}s", config.request_timeout_seconds());

    println!();
    println!("💾 Planned Exports:");
    for collection in collections {
        let columns = config
            .custom_columns()
            .unwrap_or_else(|| doorbel_reports::core::columns::columns_for(*collection));
        println!(
            "  {} -> {}/{}_<date>.csv ({} columns)",
            collection,
            config.output_path(),
            collection.file_stem(),
            columns.len()
        );
    }

    if let Some(campaign) = &config.campaign {
        println!();
        println!("📨 Campaign Targeting:");
        let describe = |name: &str, dim: &Option<Vec<String>>| match dim {
            Some(values) if !values.is_empty() => {
                println!("  {}: {}", name, values.join(", "));
            }
            _ => println!("  {}: (no constraint)", name),
        };
        describe("Cities", &campaign.audience.cities);
        describe("Roles", &campaign.audience.roles);
        describe("Status", &campaign.audience.status);
        if let Some(template) = &campaign.message.template_id {
            println!("  Template: {}", template);
        }
        if let Some(subject) = &campaign.message.subject {
            println!("  Subject: {}", subject);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Remove --dry-run to execute the job.");
}

fn display_waitlist_summary(summary: &WaitlistSummary) {
    println!();
    println!("📊 Waitlist Summary:");
    println!("  Total signups: {}", summary.total);
    println!("  Confirmed: {}", summary.confirmed);
    println!("  Launched: {}", summary.launched);
    println!("  Marketing opt-in: {}", summary.marketing_opt_in);

    if !summary.city_stats.is_empty() {
        println!("  Top cities:");
        for row in summary.city_stats.iter().take(5) {
            println!(
                "    {} - {} signups, {} confirmed ({:.0}%)",
                row.name,
                row.total,
                row.confirmed,
                row.confirmation_rate() * 100.0
            );
        }
    }

    if !summary.role_stats.is_empty() {
        println!("  Roles:");
        for row in &summary.role_stats {
            println!("    {} - {}", row.name, row.count);
        }
    }

    if let (Some(first), Some(last)) = (summary.signup_trend.first(), summary.signup_trend.last())
    {
        println!(
            "  Signup trend: {} ({}) .. {} ({})",
            first.date, first.count, last.date, last.count
        );
    }
    println!();
}
