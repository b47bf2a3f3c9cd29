use buildsheet_valuation::config::Command;
use buildsheet_valuation::utils::error::ErrorSeverity;
use buildsheet_valuation::utils::{logger, validation::Validate};
use buildsheet_valuation::{
    CliConfig, CsvFileSource, ReferenceStore, Result, ValuationConfig, ValuationEngine,
    ValuationError,
};
use clap::Parser;
use std::io::Read;
use std::sync::Arc;

fn load_config(cli: &CliConfig) -> Result<ValuationConfig> {
    let mut config = match &cli.config {
        Some(path) => ValuationConfig::from_file(path)?,
        None => ValuationConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.store.path = data.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_input(input: &str) -> Result<serde_json::Value> {
    let content = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input)?
    };
    Ok(serde_json::from_str(&content)?)
}

async fn run(cli: CliConfig) -> Result<()> {
    let config = load_config(&cli)?;
    if cli.verbose {
        tracing::debug!("Valuation config: {:?}", config);
    }

    let source = Arc::new(CsvFileSource::new(&config.store.path));
    let store = Arc::new(ReferenceStore::new(source));
    let engine = ValuationEngine::from_config(store, &config);

    match cli.command {
        Command::Search { query, limit } => {
            let limit = config.search.effective_limit(limit);
            let results = engine.search(&query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Calculate {
            input,
            manual_score,
        } => {
            let raw = read_input(&input)?;
            let price = engine.calculate(&raw, manual_score).await?;
            println!("{}", serde_json::to_string_pretty(&price)?);
        }
        Command::Check => {
            let table = engine.store().snapshot().await?;
            let summary = serde_json::json!({
                "source": table.source(),
                "records": table.len(),
                "generation": table.generation(),
                "loaded_at": table.loaded_at().to_rfc3339(),
                "pricing_version": engine.calculator().weights().version,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn exit_code(err: &ValuationError) -> i32 {
    match err.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let code = exit_code(&e);
        if code > 0 {
            std::process::exit(code);
        }
    }
}
