//! Geo Listings - operator CLI
//!
//! Runs moderation and query operations against the configured database.
//! The operator acts with the administrator capability named by
//! `admin.operator` in the config file.
//!
//! ```sh
//! # Validate config
//! geo-listings check
//!
//! # Dry-run the classifier
//! geo-listings classify --city "Naivasha"
//!
//! # Import submissions, then approve two of them
//! geo-listings import submissions.json
//! geo-listings approve 6f1c... 0b9e...
//!
//! # Local market, page 2, cafes in Riyadh
//! geo-listings query --market local --page 2 -f city=Riyadh -f subCategory=cafe
//!
//! # Sitemap of the approved set
//! geo-listings sitemap --base-url https://example.com > sitemap.xml
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};

use geo_listings::application::render_sitemap;
use geo_listings::config::AppConfig;
use geo_listings::domain::{
    Capability, ListingFilters, ListingId, MarketContext, SubmitListingDto,
};
use geo_listings::shared::{init_tracing, PageRequest};
use geo_listings::ListingsRuntime;

/// Geo Listings - moderation and query tooling for business listings.
#[derive(Parser, Debug)]
#[command(
    name = "geo-listings",
    version,
    about = "Moderation and query tooling for geo-classified business listings",
    long_about = "Geo Listings - classify, moderate and query business listings \
                  across the local and global market contexts.\n\n\
                  Default config: ~/.config/geo-listings/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "GEO_LISTINGS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file and exit.
    Check,
    /// Show how a city/address pair would be classified.
    Classify {
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Submit listings from a JSON array of submissions with an `owner` field.
    Import { file: PathBuf },
    /// Query listings in a market context.
    Query(QueryArgs),
    /// Approve pending listings.
    Approve {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Reject (delete) a pending listing.
    Reject { id: String },
    /// Set the market context of a listing and mark its location verified.
    VerifyLocation {
        id: String,
        #[arg(long, conflicts_with = "local", required_unless_present = "local")]
        global: bool,
        #[arg(long)]
        local: bool,
    },
    /// Delete listings in any state.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print a sitemap of approved listings.
    Sitemap {
        #[arg(long)]
        base_url: String,
        #[arg(long, default_value = "all")]
        market: String,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// local, global or all
    #[arg(long, default_value = "all")]
    market: String,

    /// Filter as key=value (city, subCategory, ratingTier, featuredOnly,
    /// verifiedOnly, search, owner). Repeatable.
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,

    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Defaults to `query.default_page_size`.
    #[arg(long)]
    page_size: Option<u32>,

    /// Include listings that are not approved yet.
    #[arg(long)]
    include_unapproved: bool,

    /// Print facets instead of listings.
    #[arg(long)]
    facets: bool,
}

/// One record of an import file
#[derive(Debug, Deserialize)]
struct ImportRecord {
    owner: String,
    #[serde(flatten)]
    listing: SubmitListingDto,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(geo_listings::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);
    info!("Configuration: {}", config_path.display());

    if let Command::Check = cli.command {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Database    : {}", config.database.url);
        println!("   Timeout     : {} ms", config.persistence.timeout_ms);
        println!("   Page size   : {} (max {})", config.query.default_page_size, config.query.max_page_size);
        println!("   Bulk limit  : {} ids, {} concurrent", config.bulk.max_ids, config.bulk.concurrency);
        println!("   Operator    : {}", config.admin.operator);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    let admin = Capability::admin(config.admin.operator.clone());
    let default_page_size = config.query.default_page_size;
    let runtime = ListingsRuntime::start(config).await?;

    match cli.command {
        Command::Check => {}
        Command::Classify { city, address } => {
            let classification = runtime.listings.classify(&city, &address);
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let records: Vec<ImportRecord> = serde_json::from_str(&raw)?;
            let total = records.len();
            let mut imported = 0usize;
            for (index, record) in records.into_iter().enumerate() {
                let owner = Capability::owner(record.owner);
                match runtime.listings.submit(&owner, record.listing).await {
                    Ok(listing) => {
                        imported += 1;
                        println!("{}\t{}", listing.id, listing.slug);
                    }
                    Err(e) => warn!("Record {} skipped: {}", index, e),
                }
            }
            info!("Imported {} of {} records", imported, total);
        }
        Command::Query(args) => {
            let market: MarketContext = args.market.parse()?;
            let filters = ListingFilters::from_params(args.filters.iter().map(|pair| {
                pair.split_once('=').unwrap_or((pair.as_str(), ""))
            }))?;

            if args.facets {
                let facets = runtime.query.facets(market, &filters).await?;
                println!("{}", serde_json::to_string_pretty(&facets)?);
            } else {
                let page = PageRequest::new(args.page, args.page_size.unwrap_or(default_page_size));
                let result = runtime
                    .query
                    .query(market, &filters, page, args.include_unapproved)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::Approve { ids } => {
            let report = runtime.bulk.bulk_approve(&admin, &ids).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Reject { id } => {
            let id: ListingId = id.parse()?;
            runtime.listings.reject(&admin, &id).await?;
            println!("Rejected {}", id);
        }
        Command::VerifyLocation { id, global, .. } => {
            let id: ListingId = id.parse()?;
            let listing = runtime.listings.verify_location(&admin, &id, global).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Delete { ids } => {
            let report = runtime.bulk.bulk_delete(&admin, &ids).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Sitemap { base_url, market } => {
            let market: MarketContext = market.parse()?;
            let listings = runtime.query.all_approved(market).await?;
            if listings.is_empty() {
                warn!("No approved listings in market {:?}", market);
            }
            print!("{}", render_sitemap(&base_url, &listings));
        }
    }

    Ok(())
}
