use clap::Parser;
use rusty_premium::config::AppConfig;
use rusty_premium::market::yahoo::YahooChartClient;
use rusty_premium::models::OptionFlavor;
use rusty_premium::quoter::{Quote, QuoteRequest, Quoter};

#[derive(Parser)]
#[command(name = "option-quoter")]
#[command(about = "Black-Scholes European option quote from live market data")]
struct Args {
    /// Underlying ticker (e.g. AAPL)
    symbol: String,

    /// Strike price, > 0
    #[arg(long, short = 'k', value_parser = positive_f64)]
    strike: f64,

    /// Time to maturity in years, > 0 (e.g. 0.5)
    #[arg(long, short = 't', value_parser = positive_f64)]
    maturity: f64,

    /// Option type: C or P
    #[arg(long, short = 'f')]
    flavor: OptionFlavor,

    /// Emit the quote as JSON
    #[arg(long)]
    json: bool,
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("must be a positive number, got {v}"))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let provider = YahooChartClient::new(&cfg.yahoo_base_url, cfg.http_timeout);
    let quoter = match Quoter::from_config(provider, &cfg) {
        Ok(q) => q,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let req = QuoteRequest {
        symbol: args.symbol.trim().to_uppercase(),
        strike: args.strike,
        maturity: args.maturity,
        flavor: args.flavor,
    };

    tracing::info!(
        symbol = %req.symbol,
        rate_symbol = %cfg.rate_symbol,
        period = %cfg.history_period,
        interval = %cfg.history_interval,
        "fetching market data"
    );

    let quote = match quoter.quote(&req).await {
        Ok(q) => q,
        Err(e) => {
            tracing::error!(symbol = %req.symbol, error = %e, "quote failed");
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&quote) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                tracing::error!("serialize error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print_report(&quote);
    }
}

fn print_report(q: &Quote) {
    println!("Underlying Price: {:.2}", q.spot);
    println!();
    println!("--- Black-Scholes Result ---");
    println!("Ticker: {}", q.symbol);
    println!("Option Type: {}", q.flavor);
    println!("Option Price: {:.2}", q.price);
    println!("Annualized Volatility: {:.2}%", q.volatility * 100.0);
    println!("Risk-Free Rate: {:.2}%", q.rate * 100.0);
}
