use clap::Parser;
use formfill::config::cli::{Cli, CliCommand};
use formfill::config::ProviderConfig;
use formfill::core::LlmProvider;
use formfill::utils::error::ErrorSeverity;
use formfill::utils::{logger, validation::Validate};
use formfill::{
    AnthropicClient, AppConfig, DocumentExtractor, FieldMap, FieldMapper, FillEngine, FillError,
    FillJob, FormFillPipeline, LocalStorage, OpenAiClient, PdftkToolkit, RunReport,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting formfill CLI");

    let config = if Path::new(&cli.config).exists() {
        AppConfig::from_file(&cli.config)?
    } else {
        tracing::debug!("No config file at {}, using defaults", cli.config);
        AppConfig::default()
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(3);
    }

    match cli.command {
        CliCommand::FillForm {
            target_form,
            output,
            sources,
        } => {
            let job = FillJob {
                target_form,
                sources,
                output,
            };
            match run_fill(&config, job, cli.monitor).await {
                Ok(report) => print_report(&report),
                Err(e) => exit_with_error(e),
            }
        }
        CliCommand::Batch { jobs } => {
            run_batch(&config, &jobs, cli.monitor).await?;
        }
        CliCommand::Analyze { target_form } => {
            if let Err(e) = analyze_form(&config, &target_form).await {
                exit_with_error(e);
            }
        }
        CliCommand::CheckProviders => check_providers(&config),
    }

    Ok(())
}

async fn run_fill(
    config: &AppConfig,
    job: FillJob,
    monitor: bool,
) -> formfill::Result<RunReport> {
    let providers = build_providers(config);
    if providers.is_empty() {
        tracing::warn!("⚠️ No provider API keys detected - extraction will use pattern fallback");
    }

    let field_map = match &config.mapping.field_map {
        Some(path) => FieldMap::from_file(path)?,
        None => FieldMap::fl142()?,
    };

    let extractor =
        DocumentExtractor::new(providers, field_map.clone(), config.extractor_options());
    let mapper = FieldMapper::new(field_map);
    let toolkit = PdftkToolkit::new(config.pdftk_bin(), config.pdftotext_bin());
    let storage = LocalStorage::new(".".to_string());

    let pipeline = FormFillPipeline::new(
        storage,
        toolkit,
        extractor,
        mapper,
        job,
        config.field_coverage_target(),
    );

    let engine = FillEngine::new_with_monitoring(pipeline, monitor);
    engine.run().await
}

async fn run_batch(config: &AppConfig, jobs_path: &str, monitor: bool) -> anyhow::Result<()> {
    #[derive(Debug, Deserialize)]
    struct BatchSpec {
        jobs: Vec<FillJob>,
    }

    let content = std::fs::read_to_string(jobs_path)?;
    let spec: BatchSpec = serde_json::from_str(&content)?;
    tracing::info!("Running batch of {} jobs", spec.jobs.len());

    let mut failures = 0;
    for (index, job) in spec.jobs.into_iter().enumerate() {
        tracing::info!("📋 Job {}: {} -> {}", index + 1, job.target_form, job.output);
        match run_fill(config, job, monitor).await {
            Ok(report) => {
                println!(
                    "✅ Job {}: {} fields -> {}",
                    index + 1,
                    report.fields_filled,
                    report.output_path
                );
            }
            Err(e) => {
                failures += 1;
                tracing::error!("❌ Job {} failed: {}", index + 1, e);
                eprintln!("❌ Job {}: {}", index + 1, e.user_friendly_message());
            }
        }
    }

    if failures > 0 {
        eprintln!("❌ {} job(s) failed", failures);
        std::process::exit(1);
    }
    Ok(())
}

async fn analyze_form(config: &AppConfig, target_form: &str) -> formfill::Result<()> {
    use formfill::core::FormToolkit;

    let toolkit = PdftkToolkit::new(config.pdftk_bin(), config.pdftotext_bin());
    let fields = toolkit.dump_fields(target_form).await?;

    println!("📋 {} fillable fields in {}", fields.len(), target_form);
    for field in fields {
        if field.alt_text.is_empty() {
            println!("  {} ({})", field.name, field.kind);
        } else {
            println!("  {} ({}) - {}", field.name, field.kind, field.alt_text);
        }
    }
    Ok(())
}

fn check_providers(config: &AppConfig) {
    let anthropic_key = std::env::var(formfill::adapters::anthropic::ANTHROPIC_API_KEY_ENV)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    let openai_key = std::env::var(formfill::adapters::openai::OPENAI_API_KEY_ENV)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);

    let anthropic_model = config
        .providers
        .anthropic
        .as_ref()
        .map(|p| p.model.clone())
        .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string());
    let openai_model = config
        .providers
        .openai
        .as_ref()
        .map(|p| p.model.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

    println!(
        "Anthropic: {} (model: {})",
        if anthropic_key { "✅ key set" } else { "❌ key not set" },
        anthropic_model
    );
    println!(
        "OpenAI:    {} (model: {})",
        if openai_key { "✅ key set" } else { "❌ key not set" },
        openai_model
    );

    if !anthropic_key && !openai_key {
        println!("⚠️ No provider keys detected - extraction will use the pattern fallback");
    }
}

/// Anthropic first, then OpenAI; only providers with a key in the
/// environment make it into the chain.
fn build_providers(config: &AppConfig) -> Vec<Arc<dyn LlmProvider>> {
    let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();
    let timeout = config.timeout();

    let anthropic_config = config
        .providers
        .anthropic
        .clone()
        .unwrap_or(ProviderConfig {
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            base_url: None,
        });
    if let Some(client) = AnthropicClient::from_env(&anthropic_config, timeout) {
        tracing::info!("✅ Anthropic provider enabled ({})", anthropic_config.model);
        providers.push(Arc::new(client));
    }

    let openai_config = config.providers.openai.clone().unwrap_or(ProviderConfig {
        model: DEFAULT_OPENAI_MODEL.to_string(),
        max_tokens: None,
        temperature: None,
        base_url: None,
    });
    if let Some(client) = OpenAiClient::from_env(&openai_config, timeout) {
        tracing::info!("✅ OpenAI provider enabled ({})", openai_config.model);
        providers.push(Arc::new(client));
    }

    providers
}

fn print_report(report: &RunReport) {
    tracing::info!("✅ Form fill completed successfully!");
    println!("✅ Form fill completed successfully!");
    println!("📁 Output saved to: {}", report.output_path);
    println!("📊 Fields filled: {}", report.fields_filled);
    println!("⏱️ Total time: {:?}", report.total_time);
}

fn exit_with_error(e: FillError) -> ! {
    tracing::error!(
        "❌ Form fill failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
