//! StockSync admin CLI

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use stocksync_app::{
    database::{self, Db},
    domain::products::{
        PgProductsService, ProductsService, data::NewProduct, records::ProductUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "stocksync-app", about = "StockSync admin CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    Product(ProductCommand),
}

#[derive(Debug, Args)]
struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    Create(CreateProductArgs),
    List,
}

#[derive(Debug, Args)]
struct CreateProductArgs {
    /// Product display name
    #[arg(long)]
    name: String,

    /// Unique stock keeping unit, also the barcode value
    #[arg(long)]
    sku: String,

    /// Units on hand
    #[arg(long, default_value_t = 0)]
    stock: u64,

    /// Reorder threshold
    #[arg(long, default_value_t = 0)]
    safety_stock: u64,

    /// Storage location, e.g. `A1-001`
    #[arg(long)]
    location: Option<String>,

    /// Optional product UUID; generated when omitted
    #[arg(long)]
    uuid: Option<Uuid>,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let database_url = cli
        .database_url
        .ok_or_else(|| "DATABASE_URL is required".to_string())?;

    let pool = database::connect(&database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match cli.command {
        Commands::Migrate => {
            database::migrate(&pool)
                .await
                .map_err(|error| format!("failed to run migrations: {error}"))?;

            println!("migrations applied");

            Ok(())
        }
        Commands::Product(ProductCommand { command }) => {
            let service = PgProductsService::new(Db::new(pool));

            match command {
                ProductSubcommand::Create(args) => create_product(&service, args).await,
                ProductSubcommand::List => list_products(&service).await,
            }
        }
    }
}

async fn create_product(service: &PgProductsService, args: CreateProductArgs) -> Result<(), String> {
    let product = service
        .create_product(NewProduct {
            uuid: args.uuid.map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            name: args.name,
            sku: args.sku,
            current_stock: args.stock,
            safety_stock: args.safety_stock,
            location: args.location,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("product_sku: {}", product.sku);
    println!("current_stock: {}", product.current_stock);

    Ok(())
}

async fn list_products(service: &PgProductsService) -> Result<(), String> {
    let products = service
        .list_products()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    for product in products {
        println!(
            "{}\t{}\t{}\t{}/{}",
            product.uuid, product.sku, product.name, product.current_stock, product.safety_stock
        );
    }

    Ok(())
}
