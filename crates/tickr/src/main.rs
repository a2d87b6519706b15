use anyhow::{Context, Result};
use clap::Parser;
use cli::{paper_steps, Cli, Commands::*, PaperAction, TraceLevel};
use dotenv::{dotenv, var};
use tickr_broker::{
    Bar, ClientId, Contract, Gateway, Order, PaperBook, PaperGateway, Session, Snapshot,
    DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH,
};
use tickr_eod::{returns_table, BestEffort, Config, Period};
use tickr_util::Table;
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;

fn preprocess(trace_level: Level) -> Result<()> {
    dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber).context("failed to set the tracing subscriber")
}

fn print_table(table: &Table, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&table.to_json())?);
    } else {
        println!("{table}");
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The paper book, funded from `PAPER_CASH` when set.
fn paper_book() -> Result<PaperBook> {
    let cash = match var("PAPER_CASH") {
        Ok(cash) => cash
            .parse::<f64>()
            .with_context(|| format!("PAPER_CASH is not a number: \"{cash}\""))?,
        Err(_) => DEFAULT_PAPER_CASH,
    };
    Ok(PaperBook::new(DEFAULT_PAPER_ACCOUNT, cash))
}

/// One session on `book`, opened on the first free candidate id; every step runs
/// in order and the session is closed after the last one, or after the first failure.
async fn paper(
    book: &PaperBook,
    client_ids: &[u32],
    account: Option<&str>,
    steps: &[PaperAction],
    json: bool,
) -> Result<()> {
    let candidates = client_ids.iter().copied().map(ClientId);
    let mut session = Session::open_first_free(book.gateway(), book.endpoint(), candidates).await?;

    let mut outcome = Ok(());
    for step in steps {
        debug!("[{}] paper step: {step:?}", session.client_id());
        outcome = paper_step(book, &mut session, account, step, json).await;
        if outcome.is_err() {
            break;
        }
    }

    let gateway = session.close().await;
    debug!("paper gateway connected after close: {}", gateway.is_connected());
    outcome
}

async fn paper_step(
    book: &PaperBook,
    session: &mut Session<PaperGateway>,
    account: Option<&str>,
    step: &PaperAction,
    json: bool,
) -> Result<()> {
    match step {
        PaperAction::Summary => print_json(&session.account_summary(account).await?)?,
        PaperAction::Positions => print_json(&session.positions().await?)?,
        PaperAction::Orders => print_json(&session.open_orders().await?)?,
        PaperAction::Place {
            action,
            symbol,
            quantity,
            limit,
        } => {
            let order = match limit {
                Some(price) => Order::limit(*action, *quantity, *price),
                None => Order::market(*action, *quantity),
            };
            let order = match account {
                Some(account) => order.account(account),
                None => order,
            };
            let receipt = session.place_order(&Contract::stock(symbol), &order).await?;
            print_json(&receipt)?;
        }
        PaperAction::Cancel { order_id } => session.cancel_order(*order_id).await?,
        PaperAction::Quote {
            symbol,
            last,
            high,
            low,
            close,
        } => {
            book.set_quote(Snapshot {
                last: *last,
                high: *high,
                low: *low,
                close: *close,
                ..Snapshot::empty(symbol)
            })
            .await;
        }
        PaperAction::Bar {
            symbol,
            date,
            open,
            high,
            low,
            close,
            volume,
        } => {
            let bar = Bar {
                date: *date,
                open: *open,
                high: *high,
                low: *low,
                close: *close,
                volume: *volume,
            };
            book.add_bar(symbol, bar).await;
        }
        PaperAction::Jumps { symbols, threshold } => {
            let contracts: Vec<Contract> = symbols.iter().map(|s| Contract::stock(s)).collect();
            let report = session.jump_report(&contracts, *threshold).await?;
            print_table(&report, json)?;
        }
        PaperAction::History {
            symbol,
            duration,
            bar_size,
        } => {
            let table = session
                .eod_bars(&Contract::stock(symbol), duration, bar_size)
                .await?;
            print_table(&table, json)?;
        }
        PaperAction::Search { symbol, sec_type } => {
            print_json(&session.search_contracts(symbol, *sec_type).await?)?
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    preprocess(log_level)?;
    trace!("Command line input recorded: {cli:#?}");

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // "> tickr paper <STEP> [, <STEP> ...]"
    // the paper gateway needs no provider token, so it is served before the provider is built
    if let Paper {
        client_id,
        account,
        steps,
    } = &cli.command
    {
        let steps = paper_steps(steps)?;
        let book = paper_book()?;
        return paper(&book, client_id, account.as_deref(), &steps, cli.json).await;
    }

    let config = Config::from_env(cli.token.clone())?;
    debug!("provider configuration: {config:?}");
    let eod = tickr_eod::Eod::connect(config)?;

    // cli framework:
    // "> tickr <COMMAND>"
    match &cli.command {
        // "> tickr exchanges"
        Exchanges { select } => {
            let table = eod.exchanges(select.columns.clone()).await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr symbols AS"
        Symbols { exchange, select } => {
            let table = eod.symbols(exchange, select.columns.clone()).await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr eod ZYXI.US --from 2023-01-01 --to 2023-10-01"
        Eod {
            symbol,
            from,
            to,
            period,
            select,
        } => {
            let table = eod
                .eod(symbol, *from, *to, *period, select.columns.clone())
                .await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr intraday AAPL.US --interval 1h"
        Intraday {
            symbol,
            interval,
            from,
            to,
            select,
        } => {
            let table = eod
                .intraday(symbol, *interval, *from, *to, select.columns.clone())
                .await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr news --symbol ASML.AS --limit 10"
        News {
            symbol,
            tag,
            offset,
            limit,
            select,
        } => {
            let table = eod
                .news(
                    symbol.as_deref(),
                    tag.as_deref(),
                    *offset,
                    *limit,
                    select.columns.clone(),
                )
                .await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr fundamentals ASML.AS --filter General"
        Fundamentals {
            symbol,
            filter,
            select,
        } => {
            let table = eod
                .fundamentals(symbol, filter.as_deref(), select.columns.clone())
                .await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr macro NLD inflation_consumer_prices_annual"
        Macro {
            country,
            indicator,
            select,
        } => {
            let table = eod
                .macro_indicator(country, indicator, select.columns.clone())
                .await?;
            print_table(&table, cli.json)?;
        }

        // "> tickr dividends --exchange AS INGA ASML"
        // failures are logged per ticker and left out of the table
        Dividends {
            exchange,
            field,
            tickers,
        } => {
            info!("Fetching {} for {} tickers on {exchange}", field.column(), tickers.len());
            let table = eod.dividend_batch(tickers, exchange, *field).await;
            print_table(&table, cli.json)?;
        }

        // "> tickr momentum ASML.AS --days 63"
        Momentum { symbol, days } => {
            let today = chrono::Utc::now().date_naive();
            match eod.momentum(symbol, *days, today).await {
                BestEffort::Value(momentum) => println!("{symbol} {days}-day momentum: {momentum:.6}"),
                BestEffort::Unavailable => println!("{symbol} {days}-day momentum: unavailable"),
            }
        }

        // "> tickr returns ASML.AS --from 2024-01-01"
        Returns { symbol, from, to } => {
            let columns = Some(vec!["adjusted_close".to_string()]);
            let mut table = eod.eod(symbol, *from, *to, Period::Daily, columns).await?;
            table.sort_by_column("date");
            let returns = returns_table(&table, "adjusted_close")?;
            print_table(&returns, cli.json)?;
        }

        // served above
        Paper { .. } => {}
    }

    Ok(())
}
