//! Legacy Order Engine CLI
//!
//! Imports a fixed-width legacy order export and queries the imported data.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- orders.txt > orders.json
//! cargo run -- --order-id 753 orders.txt
//! cargo run -- --from 2021-03-01 --to 2021-03-08 --format csv orders.txt
//! cargo run -- --strategy async --batch-size 2000 --workers 8 orders.txt
//! ```
//!
//! Query results go to stdout, logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unreadable file, rejected import, invalid query, nothing found)

use legacy_order_engine::cli::{self, OutputFormat, Query};
use legacy_order_engine::core::OrderService;
use legacy_order_engine::io::{write_details_csv, write_json};
use legacy_order_engine::strategy;
use legacy_order_engine::types::OrderError;
use std::io::Write;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.to_engine_config();
    let service = OrderService::in_memory(&config.cache);

    let strategy = {
        let batch = matches!(args.strategy, cli::StrategyType::Async).then(|| config.batch.clone());
        strategy::create_strategy(args.strategy, batch)
    };

    let mut output = std::io::stdout().lock();

    match strategy.import(&service, &args.input_file, config.has_header) {
        Ok(result) => tracing::info!(
            users = result.users,
            orders = result.orders,
            products = result.products,
            "import finished"
        ),
        Err(OrderError::BatchValidation { errors }) => {
            // Same payload the rejected import would have returned to a client
            if let Err(e) = write_json(&errors, &mut output) {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    if let Err(e) = run_query(&service, args.query(), args.format, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_query(
    service: &OrderService,
    query: Query,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), OrderError> {
    match (query, format) {
        (Query::Order(order_id), OutputFormat::Json) => {
            write_json(&service.get_details_by_order_id(order_id)?, output)
        }
        (Query::Order(order_id), OutputFormat::Csv) => {
            write_details_csv(&[service.get_details_by_order_id(order_id)?], output)
        }
        (Query::List { from, to }, format) => {
            let details = service.list_details_filtered(from.as_deref(), to.as_deref())?;
            match format {
                OutputFormat::Json => write_json(&details, output),
                OutputFormat::Csv => write_details_csv(&details, output),
            }
        }
    }
}
