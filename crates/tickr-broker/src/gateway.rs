use crate::error::GatewayError;
use crate::types::{
    AccountValue, Bar, ClientId, Contract, Endpoint, OpenOrder, Order, OrderId, OrderReceipt,
    Position, SecType, Snapshot,
};
use std::future::Future;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// The request/response surface of a brokerage gateway.
///
/// Each call is one exchange with the gateway, awaited to completion before the
/// next; nothing is retried. Every call but `connect` fails with
/// [`GatewayError::NotConnected`] outside a session.
pub trait Gateway {
    fn connect(
        &mut self,
        endpoint: &Endpoint,
        client_id: ClientId,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;

    fn is_connected(&self) -> bool;

    /// Tag/value pairs for `account`, or for every account when `None`.
    fn account_summary(
        &self,
        account: Option<&str>,
    ) -> impl Future<Output = GatewayResult<Vec<AccountValue>>> + Send;

    fn positions(&self) -> impl Future<Output = GatewayResult<Vec<Position>>> + Send;

    fn place_order(
        &mut self,
        contract: &Contract,
        order: &Order,
    ) -> impl Future<Output = GatewayResult<OrderReceipt>> + Send;

    fn open_orders(&self) -> impl Future<Output = GatewayResult<Vec<OpenOrder>>> + Send;

    fn cancel_order(&mut self, order_id: OrderId) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Contracts of `sec_type` whose symbol starts with `symbol`.
    fn search_contracts(
        &self,
        symbol: &str,
        sec_type: SecType,
    ) -> impl Future<Output = GatewayResult<Vec<Contract>>> + Send;

    fn snapshot(&self, contract: &Contract) -> impl Future<Output = GatewayResult<Snapshot>> + Send;

    /// Historical bars, e.g. `duration = "1 Y"`, `bar_size = "1 day"`.
    fn historical_bars(
        &self,
        contract: &Contract,
        duration: &str,
        bar_size: &str,
    ) -> impl Future<Output = GatewayResult<Vec<Bar>>> + Send;
}
