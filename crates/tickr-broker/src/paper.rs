use crate::error::GatewayError;
use crate::gateway::{Gateway, GatewayResult};
use crate::types::{
    AccountValue, Bar, ClientId, Contract, Endpoint, OpenOrder, Order, OrderId, OrderReceipt,
    OrderStatus, OrderType, Position, SecType, Snapshot,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

pub const DEFAULT_PAPER_ACCOUNT: &str = "DU0000000";
pub const DEFAULT_PAPER_CASH: f64 = 100_000.0;

#[derive(Debug)]
struct BookState {
    account: String,
    currency: String,
    cash: f64,
    sessions: BTreeSet<ClientId>,
    positions: Vec<Position>,
    orders: BTreeMap<OrderId, OpenOrder>,
    next_order_id: OrderId,
    quotes: HashMap<String, Snapshot>,
    bars: HashMap<String, Vec<Bar>>,
    contracts: BTreeMap<(String, &'static str), Contract>,
}

impl BookState {
    fn list(&mut self, contract: &Contract) {
        self.contracts
            .entry((contract.symbol.clone(), contract.sec_type.as_str()))
            .or_insert_with(|| contract.clone());
    }
}

/// The in-memory state behind a paper gateway: one account, the identifiers of
/// the open sessions, the resting orders and whatever quotes and bars were seeded.
///
/// Cloning shares the book, so several [`PaperGateway`]s can hold sessions on it
/// at once. Orders are recorded, never matched.
#[derive(Debug, Clone)]
pub struct PaperBook {
    endpoint: Endpoint,
    state: Arc<Mutex<BookState>>,
}

impl PaperBook {
    pub fn new(account: &str, cash: f64) -> Self {
        Self {
            endpoint: Endpoint::default(),
            state: Arc::new(Mutex::new(BookState {
                account: account.to_string(),
                currency: "USD".to_string(),
                cash,
                sessions: BTreeSet::new(),
                positions: Vec::new(),
                orders: BTreeMap::new(),
                next_order_id: 1,
                quotes: HashMap::new(),
                bars: HashMap::new(),
                contracts: BTreeMap::new(),
            })),
        }
    }

    /// Accept connections on `endpoint` only (default `127.0.0.1:7497`).
    pub fn listening_on(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// A fresh, unconnected gateway onto this book.
    pub fn gateway(&self) -> PaperGateway {
        PaperGateway {
            book: self.clone(),
            client_id: None,
        }
    }

    pub async fn account(&self) -> String {
        self.state.lock().await.account.clone()
    }

    /// Identifiers of every open session, ascending.
    pub async fn sessions(&self) -> Vec<ClientId> {
        self.state.lock().await.sessions.iter().copied().collect()
    }

    pub async fn set_position(&self, symbol: &str, quantity: f64, average_cost: f64) {
        let mut state = self.state.lock().await;
        let account = state.account.clone();
        let symbol = symbol.to_uppercase();
        state.list(&Contract::stock(&symbol));
        state.positions.retain(|p| p.symbol != symbol);
        state.positions.push(Position {
            account,
            symbol,
            quantity,
            average_cost,
        });
    }

    /// Make `contract` known to contract searches.
    pub async fn list(&self, contract: &Contract) {
        self.state.lock().await.list(contract);
    }

    pub async fn set_quote(&self, mut snapshot: Snapshot) {
        let mut state = self.state.lock().await;
        snapshot.symbol = snapshot.symbol.to_uppercase();
        state.list(&Contract::stock(&snapshot.symbol));
        state.quotes.insert(snapshot.symbol.clone(), snapshot);
    }

    pub async fn set_bars(&self, symbol: &str, bars: Vec<Bar>) {
        let mut state = self.state.lock().await;
        state.list(&Contract::stock(symbol));
        state.bars.insert(symbol.to_uppercase(), bars);
    }

    /// Append one bar, keeping the series in date order; a bar on an existing date
    /// replaces it.
    pub async fn add_bar(&self, symbol: &str, bar: Bar) {
        let mut state = self.state.lock().await;
        state.list(&Contract::stock(symbol));
        let series = state.bars.entry(symbol.to_uppercase()).or_default();
        series.retain(|b| b.date != bar.date);
        series.push(bar);
        series.sort_by_key(|b| b.date);
    }
}

fn validate(contract: &Contract, order: &Order) -> GatewayResult<()> {
    let positive = |price: Option<f64>| price.is_some_and(|p| p.is_finite() && p > 0.0);

    if contract.symbol.trim().is_empty() {
        return Err(GatewayError::Rejected("contract has no symbol".into()));
    }
    if !(order.quantity.is_finite() && order.quantity > 0.0) {
        return Err(GatewayError::Rejected(format!(
            "quantity must be positive, got {}",
            order.quantity
        )));
    }
    let needs_limit = matches!(order.order_type, OrderType::Limit | OrderType::StopLimit);
    if needs_limit && !positive(order.limit_price) {
        return Err(GatewayError::Rejected(format!(
            "{} order needs a positive limit price",
            order.order_type.as_str()
        )));
    }
    let needs_stop = matches!(order.order_type, OrderType::Stop | OrderType::StopLimit);
    if needs_stop && !positive(order.stop_price) {
        return Err(GatewayError::Rejected(format!(
            "{} order needs a positive stop price",
            order.order_type.as_str()
        )));
    }
    if order.order_type == OrderType::TrailingStop && !positive(order.trailing_percent) {
        return Err(GatewayError::Rejected(
            "TRAIL order needs a positive trailing percent".into(),
        ));
    }
    Ok(())
}

/// A [`Gateway`] over a [`PaperBook`]; holds at most one session at a time.
#[derive(Debug)]
pub struct PaperGateway {
    book: PaperBook,
    client_id: Option<ClientId>,
}

impl PaperGateway {
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    fn session(&self) -> GatewayResult<ClientId> {
        self.client_id.ok_or(GatewayError::NotConnected)
    }
}

impl Gateway for PaperGateway {
    async fn connect(&mut self, endpoint: &Endpoint, client_id: ClientId) -> GatewayResult<()> {
        if *endpoint != self.book.endpoint {
            return Err(GatewayError::ConnectionRefused(endpoint.clone()));
        }
        if self.client_id == Some(client_id) {
            return Ok(());
        }

        let mut state = self.book.state.lock().await;
        if state.sessions.contains(&client_id) {
            return Err(GatewayError::ClientIdInUse(client_id));
        }
        if let Some(previous) = self.client_id.take() {
            state.sessions.remove(&previous);
        }
        state.sessions.insert(client_id);
        self.client_id = Some(client_id);
        debug!("paper session {client_id} connected to {endpoint}");
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(client_id) = self.client_id.take() {
            self.book.state.lock().await.sessions.remove(&client_id);
            debug!("paper session {client_id} disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.client_id.is_some()
    }

    async fn account_summary(&self, account: Option<&str>) -> GatewayResult<Vec<AccountValue>> {
        self.session()?;
        let state = self.book.state.lock().await;
        if account.is_some_and(|a| a != state.account) {
            return Ok(Vec::new());
        }

        let value = |tag: &str, value: f64| AccountValue {
            account: state.account.clone(),
            tag: tag.to_string(),
            value: format!("{value:.2}"),
            currency: state.currency.clone(),
        };
        Ok(vec![
            value("TotalCashValue", state.cash),
            value("AvailableFunds", state.cash),
        ])
    }

    async fn positions(&self) -> GatewayResult<Vec<Position>> {
        self.session()?;
        let state = self.book.state.lock().await;
        Ok(state
            .positions
            .iter()
            .filter(|p| p.quantity != 0.0)
            .cloned()
            .collect())
    }

    async fn place_order(&mut self, contract: &Contract, order: &Order) -> GatewayResult<OrderReceipt> {
        let client_id = self.session()?;
        validate(contract, order)?;

        let mut state = self.book.state.lock().await;
        state.list(contract);
        let order_id = state.next_order_id;
        state.next_order_id += 1;

        let mut order = order.clone();
        if order.account.is_none() {
            order.account = Some(state.account.clone());
        }
        trace!("paper order {order_id}: {} {} {contract}", order.action.as_str(), order.quantity);
        state.orders.insert(
            order_id,
            OpenOrder {
                order_id,
                client_id,
                contract: contract.clone(),
                order,
                status: OrderStatus::Submitted,
            },
        );

        Ok(OrderReceipt {
            order_id,
            status: OrderStatus::Submitted,
        })
    }

    async fn open_orders(&self) -> GatewayResult<Vec<OpenOrder>> {
        self.session()?;
        let state = self.book.state.lock().await;
        Ok(state.orders.values().cloned().collect())
    }

    async fn cancel_order(&mut self, order_id: OrderId) -> GatewayResult<()> {
        self.session()?;
        let mut state = self.book.state.lock().await;
        match state.orders.remove(&order_id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::UnknownOrder(order_id)),
        }
    }

    async fn search_contracts(&self, symbol: &str, sec_type: SecType) -> GatewayResult<Vec<Contract>> {
        self.session()?;
        let prefix = symbol.trim().to_uppercase();
        let state = self.book.state.lock().await;
        Ok(state
            .contracts
            .values()
            .filter(|c| c.sec_type == sec_type && c.symbol.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn snapshot(&self, contract: &Contract) -> GatewayResult<Snapshot> {
        self.session()?;
        let state = self.book.state.lock().await;
        Ok(state
            .quotes
            .get(&contract.symbol)
            .cloned()
            .unwrap_or_else(|| Snapshot::empty(&contract.symbol)))
    }

    async fn historical_bars(
        &self,
        contract: &Contract,
        duration: &str,
        bar_size: &str,
    ) -> GatewayResult<Vec<Bar>> {
        self.session()?;
        trace!("paper bars for {contract}: {duration} of {bar_size}");
        let state = self.book.state.lock().await;
        Ok(state.bars.get(&contract.symbol).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    async fn connected(book: &PaperBook, id: u32) -> PaperGateway {
        let mut gateway = book.gateway();
        gateway.connect(book.endpoint(), ClientId(id)).await.unwrap();
        gateway
    }

    #[tokio::test]
    async fn client_ids_are_unique_across_open_sessions() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let mut first = connected(&book, 1).await;

        let mut second = book.gateway();
        assert_eq!(
            second.connect(book.endpoint(), ClientId(1)).await,
            Err(GatewayError::ClientIdInUse(ClientId(1)))
        );
        assert!(!second.is_connected());

        second.connect(book.endpoint(), ClientId(2)).await.unwrap();
        assert_eq!(book.sessions().await, vec![ClientId(1), ClientId(2)]);

        first.disconnect().await;
        second.connect(book.endpoint(), ClientId(1)).await.unwrap();
        assert_eq!(book.sessions().await, vec![ClientId(1)]);
    }

    #[tokio::test]
    async fn wrong_endpoint_is_refused() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let live = Endpoint::local(Endpoint::TWS_LIVE);
        let mut gateway = book.gateway();
        assert_eq!(
            gateway.connect(&live, ClientId(1)).await,
            Err(GatewayError::ConnectionRefused(live))
        );
    }

    #[tokio::test]
    async fn calls_need_a_session() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let mut gateway = book.gateway();
        assert_eq!(gateway.positions().await, Err(GatewayError::NotConnected));
        assert_eq!(
            gateway
                .place_order(&Contract::stock("AAPL"), &Order::market(Action::Buy, 1.0))
                .await,
            Err(GatewayError::NotConnected)
        );
    }

    #[tokio::test]
    async fn summary_is_per_account() {
        let book = PaperBook::new("DU123", 2500.0);
        let gateway = connected(&book, 7).await;

        let summary = gateway.account_summary(None).await.unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].tag, "TotalCashValue");
        assert_eq!(summary[0].value, "2500.00");
        assert_eq!(summary[0].account, "DU123");

        assert_eq!(gateway.account_summary(Some("DU123")).await.unwrap().len(), 2);
        assert!(gateway.account_summary(Some("U999")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn orders_get_increasing_ids_and_can_be_cancelled() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let mut gateway = connected(&book, 1).await;
        let aapl = Contract::stock("AAPL");

        let first = gateway
            .place_order(&aapl, &Order::limit(Action::Buy, 10.0, 180.0))
            .await
            .unwrap();
        let second = gateway
            .place_order(&aapl, &Order::market(Action::Sell, 5.0).account("DU999"))
            .await
            .unwrap();
        assert_eq!((first.order_id, second.order_id), (1, 2));
        assert_eq!(first.status, OrderStatus::Submitted);

        let open = gateway.open_orders().await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].order.account.as_deref(), Some(DEFAULT_PAPER_ACCOUNT));
        assert_eq!(open[1].order.account.as_deref(), Some("DU999"));

        gateway.cancel_order(1).await.unwrap();
        assert_eq!(gateway.cancel_order(1).await, Err(GatewayError::UnknownOrder(1)));
        assert_eq!(gateway.open_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_orders_are_rejected() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let mut gateway = connected(&book, 1).await;
        let aapl = Contract::stock("AAPL");

        let mut no_limit = Order::limit(Action::Buy, 1.0, 1.0);
        no_limit.limit_price = None;

        for order in [
            Order::market(Action::Buy, 0.0),
            Order::market(Action::Buy, f64::NAN),
            no_limit,
            Order::stop(Action::Sell, 1.0, -5.0),
            Order::trailing_stop(Action::Sell, 1.0, 0.0),
        ] {
            let result = gateway.place_order(&aapl, &order).await;
            assert!(matches!(result, Err(GatewayError::Rejected(_))), "{order:?}");
        }
        assert!(gateway.open_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flat_positions_are_hidden() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        book.set_position("aapl", 10.0, 150.25).await;
        book.set_position("MSFT", 0.0, 300.0).await;
        let gateway = connected(&book, 1).await;

        let positions = gateway.positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "AAPL");
        assert_eq!(positions[0].average_cost, 150.25);
    }

    #[tokio::test]
    async fn search_finds_listed_contracts_by_prefix() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        book.set_position("aapl", 10.0, 150.25).await;
        book.list(&Contract::stock("AAPD")).await;
        book.list(&Contract::forex("AUD", "USD")).await;
        let mut gateway = connected(&book, 1).await;
        gateway
            .place_order(&Contract::stock("MSFT"), &Order::market(Action::Buy, 1.0))
            .await
            .unwrap();

        let found = gateway.search_contracts("aap", SecType::Stock).await.unwrap();
        let symbols: Vec<&str> = found.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPD", "AAPL"]);

        assert_eq!(gateway.search_contracts("MSFT", SecType::Stock).await.unwrap().len(), 1);
        assert_eq!(gateway.search_contracts("A", SecType::Forex).await.unwrap()[0].symbol, "AUD");
        assert!(gateway.search_contracts("NVDA", SecType::Stock).await.unwrap().is_empty());

        gateway.disconnect().await;
        assert_eq!(
            gateway.search_contracts("AAPL", SecType::Stock).await,
            Err(GatewayError::NotConnected)
        );
    }

    #[tokio::test]
    async fn bars_are_kept_in_date_order() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let bar = |day, close| Bar {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1,
        };
        book.add_bar("nvda", bar(5, 2.0)).await;
        book.add_bar("NVDA", bar(4, 1.0)).await;
        book.add_bar("NVDA", bar(5, 3.0)).await;

        let gateway = connected(&book, 1).await;
        let bars = gateway
            .historical_bars(&Contract::stock("NVDA"), "1 M", "1 day")
            .await
            .unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, [1.0, 3.0]);
    }

    #[tokio::test]
    async fn unseeded_quote_is_empty() {
        let book = PaperBook::new(DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH);
        let gateway = connected(&book, 1).await;
        let snapshot = gateway.snapshot(&Contract::stock("NVDA")).await.unwrap();
        assert_eq!(snapshot, Snapshot::empty("NVDA"));
        assert!(gateway
            .historical_bars(&Contract::stock("NVDA"), "1 Y", "1 day")
            .await
            .unwrap()
            .is_empty());
    }
}
