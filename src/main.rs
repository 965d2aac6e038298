use clap::Parser;
use ea_compiler::config::cli::CliArgs;
use ea_compiler::config::toml_config::TomlConfig;
use ea_compiler::core::ConfigProvider;
use ea_compiler::utils::{logger, validation::Validate};
use ea_compiler::{
    CompileError, CompileReport, CompileRequest, CompilerConfig, ExternalCompiler, LocalStorage,
    Orchestrator,
};

fn load_config(args: &CliArgs) -> Result<CompilerConfig, CompileError> {
    let mut config = CompilerConfig::from_env()?;
    if let Some(path) = &args.config {
        tracing::info!("📁 Loading configuration from: {}", path.display());
        config.merge_file(&TomlConfig::from_file(path)?);
    }
    config.validate()?;
    Ok(config)
}

fn finish(report: &CompileReport) -> anyhow::Result<()> {
    println!("{}", report.to_json()?);
    std::process::exit(if report.success { 0 } else { 1 });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Usage errors exit 1, not clap's default of 2.
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            return finish(&CompileReport::failed(&e, Vec::new()));
        }
    };
    tracing::debug!("Config: {:?}", config);

    let mut request = CompileRequest::new(&args.source_file, args.product_id.clone());
    if let Some(key) = &args.license_key {
        request = request.with_license_key(key.clone());
    }

    let backend = ExternalCompiler::new(config.compiler_path());
    let orchestrator = Orchestrator::new(LocalStorage::new(), backend, config);
    let report = orchestrator.compile(&request).await;

    finish(&report)
}
