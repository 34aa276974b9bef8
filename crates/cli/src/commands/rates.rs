//! Exchange rate commands.

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;

use anonshop_core::Currency;
use anonshop_storefront::error::AppError;
use anonshop_storefront::services::RateTable;
use anonshop_storefront::state::AppState;

use super::CliError;

#[derive(Subcommand)]
pub enum RatesAction {
    /// Show EUR rates (cached, falling back to built-in defaults)
    Show,
    /// Drop the cache and fetch fresh rates, failing if the source is down
    Refresh,
    /// Convert an amount between currencies
    Convert {
        amount: Decimal,
        from: Currency,
        to: Currency,
    },
}

fn log_table(table: &RateTable) {
    for (currency, eur) in table.iter() {
        info!(currency = %currency, eur_per_unit = %eur, "Rate");
    }
}

/// Run a rates command.
///
/// # Errors
///
/// `refresh` returns an error if the rate source can't be reached.
pub async fn run(state: &AppState, action: RatesAction) -> Result<(), CliError> {
    match action {
        RatesAction::Show => log_table(&state.rates().current().await),
        RatesAction::Refresh => {
            state.rates().invalidate().await;
            log_table(&state.rates().fetch().await?);
        }
        RatesAction::Convert { amount, from, to } => {
            let converted = state
                .rates()
                .current()
                .await
                .convert(amount, from, to)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("{amount} {from} is too large to convert"))
                })?;
            info!(
                amount = %amount,
                from = %from,
                converted = %converted,
                to = %to,
                "Converted"
            );
        }
    }
    Ok(())
}
