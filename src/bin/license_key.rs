use clap::Parser;
use ea_compiler::config::cli::LicenseKeyArgs;
use ea_compiler::core::license::generate_license_key;
use ea_compiler::utils::logger;

fn main() {
    let args = LicenseKeyArgs::parse();
    logger::init_cli_logger(false);

    let key = generate_license_key(&args.user_id, &args.product_id);
    tracing::info!("🔐 Generated license key for product {}", args.product_id);
    println!("{}", key);
}
