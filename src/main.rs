use actix_web::{App, HttpServer, web};
use clap::{Parser, Subcommand};
use kilnstore::application::checkout::CheckoutService;
use kilnstore::application::intake::IntakeService;
use kilnstore::config::{AppConfig, NotifyMode};
use kilnstore::domain::ports::{
    CustomOrderStoreRef, NotifierRef, OrderStoreRef, ProductStoreRef,
};
use kilnstore::infrastructure::in_memory::{
    InMemoryCustomOrderStore, InMemoryOrderStore, InMemoryProductStore,
};
use kilnstore::infrastructure::notify::{DirectNotifier, LogMailer, MailerRef, QueuedNotifier};
use kilnstore::infrastructure::razorpay::RazorpayGateway;
use kilnstore::interfaces::csv::order_writer::OrderWriter;
use kilnstore::interfaces::csv::product_reader::ProductReader;
use kilnstore::interfaces::http::{AppState, routes};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Pottery studio storefront backend", long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the storefront HTTP API
    Serve,
    /// Bulk-import the product catalog from a CSV file
    LoadProducts {
        /// Input products CSV file
        input: PathBuf,
    },
    /// Export all orders as CSV to stdout
    ExportOrders,
}

struct Stores {
    orders: OrderStoreRef,
    products: ProductStoreRef,
    custom_orders: CustomOrderStoreRef,
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: PathBuf) -> Result<Stores> {
    let store = kilnstore::infrastructure::rocksdb::RocksDbStore::open(path).into_diagnostic()?;
    Ok(Stores {
        orders: Arc::new(store.clone()),
        products: Arc::new(store.clone()),
        custom_orders: Arc::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(_path: PathBuf) -> Result<Stores> {
    Err(miette::miette!(
        "--db-path requires a build with the storage-rocksdb feature"
    ))
}

fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    match db_path {
        Some(path) => open_persistent(path),
        None => Ok(Stores {
            orders: Arc::new(InMemoryOrderStore::new()),
            products: Arc::new(InMemoryProductStore::new()),
            custom_orders: Arc::new(InMemoryCustomOrderStore::new()),
        }),
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let stores = open_stores(cli.db_path)?;

    match cli.command {
        Commands::Serve => serve(stores).await,
        Commands::LoadProducts { input } => load_products(stores, input).await,
        Commands::ExportOrders => export_orders(stores).await,
    }
}

async fn serve(stores: Stores) -> Result<()> {
    let config = AppConfig::from_env().into_diagnostic()?;

    let gateway = Arc::new(RazorpayGateway::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
        config.razorpay_base_url.clone(),
    ));
    let mailer: MailerRef = Arc::new(LogMailer);
    let notifier: NotifierRef = match config.notify_mode {
        NotifyMode::Queued => Arc::new(QueuedNotifier::spawn(mailer, 64)),
        NotifyMode::Direct => Arc::new(DirectNotifier::new(mailer)),
    };

    let checkout = Arc::new(CheckoutService::new(
        stores.orders.clone(),
        stores.products.clone(),
        gateway,
        notifier.clone(),
        config.shipping,
        config.currency.clone(),
        config.company_email.clone(),
        config.debug_errors,
    ));
    let intake = Arc::new(IntakeService::new(
        stores.custom_orders.clone(),
        notifier,
        config.company_email.clone(),
    ));

    let state = AppState {
        checkout,
        intake,
        products: stores.products.clone(),
        orders: stores.orders.clone(),
    };

    tracing::info!(
        host = %config.server_host,
        port = config.server_port,
        "starting storefront server"
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind((config.server_host.clone(), config.server_port))
    .into_diagnostic()?
    .run()
    .await
    .into_diagnostic()
}

async fn load_products(stores: Stores, input: PathBuf) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let reader = ProductReader::new(file);

    let mut loaded = 0usize;
    for record in reader.products() {
        match record {
            Ok(product) => {
                stores.products.upsert(product).await.into_diagnostic()?;
                loaded += 1;
            }
            Err(e) => {
                eprintln!("Error reading product: {e}");
            }
        }
    }

    println!("Loaded {loaded} products");
    Ok(())
}

async fn export_orders(stores: Stores) -> Result<()> {
    let orders = stores.orders.all().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(orders).into_diagnostic()?;

    Ok(())
}
