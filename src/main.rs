use clap::Parser;
use miette::{IntoDiagnostic, Result};
use postage_engine::application::rate_engine::RateEngine;
use postage_engine::config::EngineConfig;
use postage_engine::domain::ids::{Locale, ModuleId, TaxRuleId};
use postage_engine::domain::money::DeclaredValue;
use postage_engine::domain::ports::ReferenceDataStoreBox;
use postage_engine::error::RateError;
use postage_engine::infrastructure::in_memory::InMemoryReferenceStore;
use postage_engine::interfaces::csv::postage_writer::{PostageRecord, PostageWriter};
use postage_engine::interfaces::csv::request_reader::{RequestReader, RequestRecord};
use postage_engine::interfaces::json::catalog_reader::CatalogReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Quote requests CSV file (country, weight, locale[, tax_rule, declared_value])
    input: PathBuf,

    /// Carrier catalog JSON file (zones, prices, insurances, tax rules)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Delivery module the eligible zones are attached to
    #[arg(long, default_value_t = 1)]
    carrier_module_id: u32,

    /// Tax rule applied to postage when a request names none
    #[arg(long)]
    default_tax_rule_id: Option<u32>,

    /// Locale used for tax rule titles missing in the requested locale
    #[arg(long)]
    fallback_locale: Option<Locale>,

    /// Do not offer insurance tiers
    #[arg(long)]
    no_insurance: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace); without it RUST_LOG applies
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            carrier_module_id: ModuleId(self.carrier_module_id),
            default_tax_rule_id: self.default_tax_rule_id.map(TaxRuleId),
            fallback_locale: self.fallback_locale.clone(),
            allow_insurance: !self.no_insurance,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&PathBuf>) -> Result<ReferenceDataStoreBox> {
    use postage_engine::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryReferenceStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&PathBuf>) -> Result<ReferenceDataStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryReferenceStore::new()))
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.engine_config();
    let store = open_store(cli.db_path.as_ref())?;

    // A catalog on the command line replaces whatever the store held
    if let Some(catalog) = &cli.catalog {
        let file = File::open(catalog).into_diagnostic()?;
        let data = CatalogReader::new(file)
            .read(config.carrier_module_id)
            .into_diagnostic()?;
        store.store(data).await.into_diagnostic()?;
    }

    let Some(data) = store.load().await.into_diagnostic()? else {
        miette::bail!("No reference data: pass --catalog, or --db-path pointing at a populated database");
    };
    let engine = RateEngine::new(&data, &config).into_diagnostic()?;

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    let stdout = io::stdout();
    let mut writer = PostageWriter::new(stdout.lock());

    for request in reader.requests() {
        match request {
            Ok(request) => match quote_row(&engine, &request) {
                Ok(record) => writer.write(&record).into_diagnostic()?,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "Error quoting request, skipped");
                }
                Err(e) => {
                    writer.flush().into_diagnostic()?;
                    return Err(e).into_diagnostic();
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Error reading request, skipped");
            }
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}

fn quote_row(engine: &RateEngine, request: &RequestRecord) -> Result<PostageRecord, RateError> {
    let quote = engine.quote(&request.quote_request())?;
    let insurance = match request.declared_value {
        Some(value) => engine.insurance().tier_for_value(DeclaredValue::new(value)?),
        None => None,
    };
    Ok(PostageRecord::new(
        request.country.trim().to_ascii_uppercase(),
        request.weight,
        &quote,
        insurance,
    ))
}
