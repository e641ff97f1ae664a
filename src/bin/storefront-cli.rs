use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use storefront_core::checkout::{compute_key, LineItem, OrderClient, PlaceOrder};
use storefront_core::config::{load_config, StorefrontConfig};
use storefront_core::http::{HttpClient, RequestOptions, ServiceId};
use storefront_core::observability::{logging, metrics};
use storefront_core::routing::{
    escape_html, handler, HtmlBuffer, MemoryLocation, RenderTarget, RouteHandler, Router,
};

#[derive(Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Exercise the storefront client runtime from a terminal", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a path from a backend service (same-origin, inventory, recommendations, checkout)
    Fetch { service: ServiceId, path: String },
    /// Resolve a path against the storefront routes and print the rendered page
    Route { path: String },
    /// Print the idempotency key for a JSON array of line items ("-" for stdin)
    OrderKey { file: String },
    /// Submit an order (JSON file) to the checkout service
    PlaceOrder { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => StorefrontConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Fetch { service, path } => {
            let client = HttpClient::from_config(&config)?;
            match client.request(service, &path, RequestOptions::get()).await {
                Ok(response) => match response.json::<Value>() {
                    Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
                    Err(_) => println!("{}", response.text()),
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!("{}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
        Commands::Route { path } => {
            let root = Arc::new(HtmlBuffer::new());
            let location = Arc::new(MemoryLocation::new());
            let mut router = Router::initialize(root, storefront_routes(), location)?;
            router.navigate_to(&path);
            router.pump();
            println!("{}", router.root().content());
        }
        Commands::OrderKey { file } => {
            let items: Vec<LineItem> = serde_json::from_str(&read_input(&file)?)?;
            println!("{}", compute_key(&items));
        }
        Commands::PlaceOrder { file } => {
            let order: PlaceOrder = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let client = OrderClient::new(HttpClient::from_config(&config)?);
            match client.place_order(&order).await {
                Ok(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!("{}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn read_input(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(Path::new(file))
    }
}

fn storefront_routes() -> Vec<(&'static str, RouteHandler<Arc<HtmlBuffer>>)> {
    vec![
        (
            "/",
            handler(|root: &Arc<HtmlBuffer>, _| {
                root.render("<section class=\"home\"><h2>Welcome</h2></section>")
            }),
        ),
        (
            "/catalog",
            handler(|root: &Arc<HtmlBuffer>, _| {
                root.render("<section class=\"catalog\"><h2>Catalog</h2></section>")
            }),
        ),
        (
            "/book/:id",
            handler(|root: &Arc<HtmlBuffer>, params| {
                let id = escape_html(params.get("id").unwrap_or_default());
                root.render(&format!(
                    "<section class=\"book\" data-id=\"{}\"><h2>Book {}</h2></section>",
                    id, id
                ))
            }),
        ),
        (
            "/cart",
            handler(|root: &Arc<HtmlBuffer>, _| {
                root.render("<section class=\"cart\"><h2>Your cart</h2></section>")
            }),
        ),
    ]
}
