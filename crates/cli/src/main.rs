//! Jersey Shop CLI - database tools and a terminal cart.
//!
//! # Usage
//!
//! ```bash
//! # Run cart API database migrations
//! js-cli migrate
//!
//! # Load the demo catalog
//! js-cli seed crates/cli/fixtures/demo_catalog.json
//!
//! # Issue a bearer token for user 7
//! js-cli token issue --user-id 7 --name "Ana" --days 30
//!
//! # Browse the catalog
//! js-cli catalog list --search sporting
//! js-cli catalog show 3
//!
//! # Work with the cart (guest unless JERSEY_SHOP_TOKEN is set)
//! js-cli cart add 3 --size L --number 10 --patch Liga
//! js-cli cart remove 3 --size L --number 10 --patch Liga
//! js-cli cart show
//! js-cli cart clear
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jersey_shop_core::Size;
use jersey_shop_storefront::catalog::JerseyQuery;

mod commands;

#[derive(Parser)]
#[command(name = "js-cli")]
#[command(author, version, about = "Jersey Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cart API database migrations
    Migrate,
    /// Seed the catalog from a JSON file
    Seed {
        /// Path to the catalog file
        file: PathBuf,
    },
    /// Manage cart API bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect and change the cart
    Cart {
        /// User ID shown for the signed-in session
        #[arg(long, env = "JERSEY_SHOP_USER_ID", default_value_t = 0, global = true)]
        user_id: i32,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token and print it
    Issue {
        /// User the token belongs to
        #[arg(long)]
        user_id: i32,

        /// Display name for the user
        #[arg(short, long, default_value = "")]
        name: String,

        /// Days until the token expires (never, if omitted)
        #[arg(long)]
        days: Option<i64>,
    },
    /// Delete expired tokens
    Prune,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Show one jersey
    Show { id: i32 },
    /// List jerseys
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        team_id: Option<i32>,
        #[arg(long)]
        league_id: Option<i32>,
        #[arg(long)]
        main_color: Option<String>,
        /// newest, price_asc or price_desc
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print items and totals
    Show,
    /// Add one unit of a jersey configuration
    Add(LineOpts),
    /// Remove the line with this configuration
    Remove(LineOpts),
    /// Remove every line
    Clear,
}

#[derive(Args)]
struct LineOpts {
    /// Jersey ID
    jersey_id: i32,

    /// Size (S, M, L, XL, XXL, XXXL)
    #[arg(short, long)]
    size: Size,

    /// Name printed on the back
    #[arg(long)]
    name: Option<String>,

    /// Number printed on the back
    #[arg(long)]
    number: Option<String>,

    /// Patch to add (repeatable)
    #[arg(long = "patch")]
    patches: Vec<String>,
}

impl From<LineOpts> for commands::cart::LineArgs {
    fn from(opts: LineOpts) -> Self {
        Self {
            jersey_id: opts.jersey_id,
            size: opts.size,
            name: opts.name,
            number: opts.number,
            patches: opts.patches,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "js_cli=info,jersey_shop_storefront=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Token { action } => match action {
            TokenAction::Issue {
                user_id,
                name,
                days,
            } => {
                let token = commands::token::issue(user_id, &name, days).await?;
                commands::print_json(&serde_json::json!({ "token": token }))?;
            }
            TokenAction::Prune => commands::token::prune().await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Show { id } => commands::catalog::show(id).await?,
            CatalogAction::List {
                search,
                team_id,
                league_id,
                main_color,
                sort_by,
                page,
                limit,
            } => {
                let query = JerseyQuery {
                    search,
                    team_id,
                    league_id,
                    main_color,
                    sort_by,
                    page,
                    limit,
                };
                commands::catalog::list(query).await?;
            }
        },
        Commands::Cart { user_id, action } => match action {
            CartAction::Show => commands::cart::show(user_id).await?,
            CartAction::Add(opts) => commands::cart::add(user_id, &opts.into()).await?,
            CartAction::Remove(opts) => commands::cart::remove(user_id, &opts.into()).await?,
            CartAction::Clear => commands::cart::clear(user_id).await?,
        },
    }
    Ok(())
}
