//! Saffron CLI - database migrations and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! saffron migrate
//!
//! # Manage promo codes
//! saffron promo create --code WELCOME10 --kind percentage --value 10
//! saffron promo list
//! saffron promo enable WELCOME10
//! saffron promo disable WELCOME10
//!
//! # Change delivery fees
//! saffron settings delivery --base-fee 4.50 --free-threshold 40
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use saffron_core::DiscountKind;

mod commands;

#[derive(Parser)]
#[command(name = "saffron")]
#[command(author, version, about = "Saffron CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage promo codes
    Promo {
        #[command(subcommand)]
        action: PromoAction,
    },
    /// Manage stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum PromoAction {
    /// Create a new promo code
    Create {
        /// Code customers type at checkout (stored uppercase)
        #[arg(long)]
        code: String,

        /// Discount kind (`percentage`, `fixed`, `free_delivery`)
        #[arg(long)]
        kind: DiscountKind,

        /// Percent or amount off; ignored for free delivery
        #[arg(long, default_value = "0")]
        value: Decimal,

        /// Minimum subtotal required
        #[arg(long = "min-order")]
        min_order: Option<Decimal>,

        /// Cap on a percentage discount
        #[arg(long)]
        max_discount: Option<Decimal>,

        /// Total redemptions allowed
        #[arg(long)]
        usage_limit: Option<i32>,

        /// Redemptions allowed per customer
        #[arg(long)]
        per_user_limit: Option<i32>,

        /// First valid moment (RFC 3339)
        #[arg(long)]
        starts_at: Option<DateTime<Utc>>,

        /// Last valid moment (RFC 3339)
        #[arg(long)]
        ends_at: Option<DateTime<Utc>>,
    },
    /// List all promo codes
    List,
    /// Enable a promo code
    Enable {
        /// The promo code
        code: String,
    },
    /// Disable a promo code
    Disable {
        /// The promo code
        code: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Set delivery fee and free-delivery threshold
    Delivery {
        /// Fee charged below the threshold
        #[arg(long)]
        base_fee: Decimal,

        /// Subtotal at or above which delivery is free
        #[arg(long)]
        free_threshold: Decimal,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Promo { action } => match action {
            PromoAction::Create {
                code,
                kind,
                value,
                min_order,
                max_discount,
                usage_limit,
                per_user_limit,
                starts_at,
                ends_at,
            } => {
                let new = commands::promo::definition(
                    code,
                    kind,
                    value,
                    min_order,
                    max_discount,
                    usage_limit,
                    per_user_limit,
                    starts_at,
                    ends_at,
                );
                commands::promo::create(new).await?;
            }
            PromoAction::List => commands::promo::list().await?,
            PromoAction::Enable { code } => commands::promo::set_active(&code, true).await?,
            PromoAction::Disable { code } => commands::promo::set_active(&code, false).await?,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Delivery {
                base_fee,
                free_threshold,
            } => commands::settings::set_delivery(base_fee, free_threshold).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_promo_create() {
        let cli = Cli::try_parse_from([
            "saffron",
            "promo",
            "create",
            "--code",
            "summer25",
            "--kind",
            "percentage",
            "--value",
            "25",
            "--max-discount",
            "12.50",
            "--ends-at",
            "2026-09-01T00:00:00Z",
        ])
        .unwrap();

        let Commands::Promo {
            action:
                PromoAction::Create {
                    kind,
                    value,
                    max_discount,
                    ends_at,
                    min_order,
                    ..
                },
        } = cli.command
        else {
            panic!("expected promo create");
        };
        assert_eq!(kind, DiscountKind::Percentage);
        assert_eq!(value, Decimal::new(25, 0));
        assert_eq!(max_discount, Some(Decimal::new(1250, 2)));
        assert_eq!(min_order, None);
        assert!(ends_at.is_some());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Cli::try_parse_from([
            "saffron", "promo", "create", "--code", "BOGO", "--kind", "bogo",
        ]);
        assert!(result.is_err());
    }
}
