//! `finmate portfolio` - manage the ticker list

use clap::Subcommand;
use std::path::Path;

use crate::portfolio::PortfolioFile;

#[derive(Subcommand, Debug)]
pub enum PortfolioAction {
    /// Print the stored tickers
    List,
    /// Add a ticker
    Add { ticker: String },
    /// Remove a ticker
    Remove { ticker: String },
}

pub fn run(path: &Path, action: PortfolioAction) -> anyhow::Result<()> {
    let file = PortfolioFile::new(path);

    match action {
        PortfolioAction::List => {
            let tickers = file.load();
            if tickers.is_empty() {
                println!("Portfolio is empty ({})", file.path().display());
            } else {
                for ticker in tickers {
                    println!("{ticker}");
                }
            }
        }
        PortfolioAction::Add { ticker } => {
            if file.add(&ticker)? {
                println!("Added {}", ticker.trim().to_uppercase());
            } else {
                println!("{} is already in the portfolio", ticker.trim().to_uppercase());
            }
        }
        PortfolioAction::Remove { ticker } => {
            if file.remove(&ticker)? {
                println!("Removed {}", ticker.trim().to_uppercase());
            } else {
                println!("{} is not in the portfolio", ticker.trim().to_uppercase());
            }
        }
    }

    Ok(())
}
