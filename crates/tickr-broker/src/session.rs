use crate::convert::bars_to_eod;
use crate::error::GatewayError;
use crate::gateway::{Gateway, GatewayResult};
use crate::snapshot::{jump_table, IntradayJump, JumpStatus};
use crate::types::{
    AccountValue, Bar, ClientId, Contract, Endpoint, OpenOrder, Order, OrderId, OrderReceipt,
    Position, SecType, Snapshot,
};
use anyhow::Result;
use tickr_util::Table;
use tracing::{debug, error, info, warn};

/// An open gateway session, opened around one named task and closed afterwards.
///
/// The session identifier is always the caller's choice; nothing here picks
/// one on the caller's behalf.
#[derive(Debug)]
pub struct Session<G> {
    gateway: G,
    endpoint: Endpoint,
    client_id: ClientId,
}

impl<G> Session<G>
where
    G: Gateway + Send,
{
    /// Connect `gateway` to `endpoint` as `client_id`.
    ///
    /// A collision is logged with the identifier and returned as
    /// [`GatewayError::ClientIdInUse`]; the caller decides whether to try another.
    pub async fn open(mut gateway: G, endpoint: &Endpoint, client_id: ClientId) -> GatewayResult<Self> {
        connect(&mut gateway, endpoint, client_id).await?;
        Ok(Self {
            gateway,
            endpoint: endpoint.clone(),
            client_id,
        })
    }

    /// Try each of `candidates` in order and keep the first identifier that is free.
    ///
    /// Only collisions move on to the next candidate; any other failure ends the
    /// attempt. Running out of candidates gives [`GatewayError::NoFreeClientId`].
    pub async fn open_first_free(
        mut gateway: G,
        endpoint: &Endpoint,
        candidates: impl IntoIterator<Item = ClientId>,
    ) -> GatewayResult<Self> {
        for client_id in candidates {
            match connect(&mut gateway, endpoint, client_id).await {
                Ok(()) => {
                    return Ok(Self {
                        gateway,
                        endpoint: endpoint.clone(),
                        client_id,
                    })
                }
                Err(GatewayError::ClientIdInUse(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        warn!("no free client id on {endpoint}");
        Err(GatewayError::NoFreeClientId)
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn account_summary(&self, account: Option<&str>) -> GatewayResult<Vec<AccountValue>> {
        self.gateway.account_summary(account).await.map_err(|e| {
            error!("[{}] account summary failed: {e}", self.client_id);
            e
        })
    }

    pub async fn positions(&self) -> GatewayResult<Vec<Position>> {
        self.gateway.positions().await.map_err(|e| {
            error!("[{}] positions failed: {e}", self.client_id);
            e
        })
    }

    pub async fn place_order(&mut self, contract: &Contract, order: &Order) -> GatewayResult<OrderReceipt> {
        let client_id = self.client_id;
        let receipt = self.gateway.place_order(contract, order).await.map_err(|e| {
            error!("[{client_id}] {} {} {contract}: {e}", order.action.as_str(), order.quantity);
            e
        })?;
        info!(
            "[{client_id}] order {} {} {} {contract}: {}",
            receipt.order_id,
            order.action.as_str(),
            order.quantity,
            receipt.status
        );
        Ok(receipt)
    }

    pub async fn open_orders(&self) -> GatewayResult<Vec<OpenOrder>> {
        self.gateway.open_orders().await.map_err(|e| {
            error!("[{}] open orders failed: {e}", self.client_id);
            e
        })
    }

    pub async fn cancel_order(&mut self, order_id: OrderId) -> GatewayResult<()> {
        let client_id = self.client_id;
        self.gateway.cancel_order(order_id).await.map_err(|e| {
            error!("[{client_id}] cancel failed: {e}");
            e
        })?;
        info!("[{client_id}] order {order_id} cancelled");
        Ok(())
    }

    pub async fn search_contracts(&self, symbol: &str, sec_type: SecType) -> GatewayResult<Vec<Contract>> {
        let found = self.gateway.search_contracts(symbol, sec_type).await.map_err(|e| {
            error!("[{}] contract search for {symbol} failed: {e}", self.client_id);
            e
        })?;
        debug!("[{}] {} contracts match {symbol}", self.client_id, found.len());
        Ok(found)
    }

    pub async fn snapshot(&self, contract: &Contract) -> GatewayResult<Snapshot> {
        self.gateway.snapshot(contract).await
    }

    pub async fn historical_bars(
        &self,
        contract: &Contract,
        duration: &str,
        bar_size: &str,
    ) -> GatewayResult<Vec<Bar>> {
        self.gateway.historical_bars(contract, duration, bar_size).await
    }

    /// Intraday jump of every contract, one snapshot each, as a
    /// `symbol, jump_pct, change_pct, status` table in the order given.
    pub async fn jump_report(&self, contracts: &[Contract], threshold: f64) -> Result<Table> {
        let mut jumps = Vec::with_capacity(contracts.len());
        for contract in contracts {
            let snapshot = self.snapshot(contract).await.map_err(|e| {
                error!("[{}] snapshot of {contract} failed: {e}", self.client_id);
                e
            })?;
            jumps.push(IntradayJump::from_snapshot(&snapshot, threshold));
        }

        let alerts = jumps.iter().filter(|j| j.status == JumpStatus::Alert).count();
        match alerts {
            0 => info!("[{}] all {} symbols within {threshold}%", self.client_id, jumps.len()),
            n => warn!("[{}] {n} symbol(s) moved more than {threshold}%", self.client_id),
        }
        jump_table(&jumps)
    }

    /// Historical bars of `contract` in the provider's end-of-day table layout.
    pub async fn eod_bars(&self, contract: &Contract, duration: &str, bar_size: &str) -> Result<Table> {
        let bars = self
            .historical_bars(contract, duration, bar_size)
            .await
            .map_err(|e| {
                error!("[{}] bars for {contract} failed: {e}", self.client_id);
                e
            })?;
        bars_to_eod(&bars)
    }

    /// Disconnect and hand the gateway back.
    pub async fn close(mut self) -> G {
        self.gateway.disconnect().await;
        debug!("session {} on {} closed", self.client_id, self.endpoint);
        self.gateway
    }
}

async fn connect<G>(gateway: &mut G, endpoint: &Endpoint, client_id: ClientId) -> GatewayResult<()>
where
    G: Gateway + Send,
{
    match gateway.connect(endpoint, client_id).await {
        Ok(()) => {
            info!("session {client_id} open on {endpoint}");
            Ok(())
        }
        Err(GatewayError::ClientIdInUse(id)) => {
            error!("client id {id} is already in use on {endpoint}");
            Err(GatewayError::ClientIdInUse(id))
        }
        Err(e) => {
            error!("failed to connect to {endpoint} as {client_id}: {e}");
            Err(e)
        }
    }
}
