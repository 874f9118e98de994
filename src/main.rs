//! Jinju - 分页文档文学句子提取
//!
//! ingest: 文档 → 跨页修复 → 分块 → 单元库
//! extract: 单元库 → 提取服务 → 汇总输出

use clap::Parser;

use jinju::application::RunLibraryExtraction;
use jinju::cli::{CliArgs, Command, ExtractOptions};
use jinju::config::{load_config_from_path, print_config, validate_config, LogConfig};
use jinju::domain::document::DocumentName;
use jinju::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let mut config = load_config_from_path(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    args.apply(&mut config);
    validate_config(&config).map_err(|e| anyhow::anyhow!("Invalid arguments: {}", e))?;

    init_tracing(&config.log);
    print_config(&config);

    let pipeline = Pipeline::new(config).await?;

    match args.command {
        Command::Ingest(ingest) => {
            ingest_files(&pipeline, &ingest.files, ingest.format).await?;
        }
        Command::Extract(extract) => {
            let documents = extract
                .documents
                .iter()
                .map(DocumentName::new)
                .collect::<Result<Vec<_>, _>>()?;
            run_extraction(&pipeline, documents, &extract.options).await?;
        }
        Command::Run { ingest, options } => {
            let documents = ingest_files(&pipeline, &ingest.files, ingest.format).await?;
            if documents.is_empty() {
                anyhow::bail!("No document was ingested");
            }
            run_extraction(&pipeline, documents, &options).await?;
        }
        Command::List => {
            for listing in pipeline.list().await? {
                match &listing.summary {
                    Some(summary) => println!(
                        "{}\t{}\t{} pages\t{} units\t{}",
                        listing.name,
                        summary.format,
                        summary.total_pages,
                        listing.unit_count,
                        summary.created_at.format("%Y-%m-%d %H:%M:%S")
                    ),
                    None => println!("{}\t-\t-\t{} units\t-", listing.name, listing.unit_count),
                }
            }
        }
        Command::Check { .. } => {
            let provider = pipeline.config().extractor.provider.clone();
            if pipeline.check().await? {
                println!("{}: ok", provider);
            } else {
                anyhow::bail!("{}: unavailable", provider);
            }
        }
    }

    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},jinju={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 导入文件，返回成功导入的文档
async fn ingest_files(
    pipeline: &Pipeline,
    files: &[std::path::PathBuf],
    format: Option<jinju::domain::document::DocumentFormat>,
) -> anyhow::Result<Vec<DocumentName>> {
    let mut documents = Vec::new();
    for (file, result) in pipeline.ingest(files, format).await {
        match result {
            Ok(report) => {
                println!(
                    "{}: {} pages, {} units{}",
                    report.document,
                    report.total_pages,
                    report.total_units,
                    if report.unreadable_pages.is_empty() {
                        String::new()
                    } else {
                        format!(", unreadable pages {:?}", report.unreadable_pages)
                    }
                );
                documents.push(report.document);
            }
            Err(e) => eprintln!("{}: {}", file.display(), e),
        }
    }
    Ok(documents)
}

async fn run_extraction(
    pipeline: &Pipeline,
    documents: Vec<DocumentName>,
    options: &ExtractOptions,
) -> anyhow::Result<()> {
    let command = RunLibraryExtraction {
        documents,
        start: options.start,
        end: options.end,
        instruction: options.instruction.clone(),
    };

    let report = pipeline.extract(command).await?;
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(summary) => println!(
                "{} [{}-{}]: {} processed, {} skipped, {} failed, {} with sentences -> {}",
                outcome.document,
                summary.start,
                summary.end,
                summary.processed,
                summary.skipped,
                summary.failed,
                summary.emitted,
                summary
                    .output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(no output)".to_string())
            ),
            Err(e) => eprintln!("{}: {}", outcome.document, e),
        }
    }

    if report.failed() > 0 {
        anyhow::bail!("{} of {} documents failed", report.failed(), report.outcomes.len());
    }
    Ok(())
}
