use crate::types::{ClientId, Endpoint, OrderId};
use thiserror::Error;

/// Failures a gateway reports back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Another open session already holds this identifier; pick a different one.
    #[error("client id {0} is already in use")]
    ClientIdInUse(ClientId),

    #[error("no candidate client id was free")]
    NoFreeClientId,

    #[error("not connected")]
    NotConnected,

    #[error("connection refused by {0}")]
    ConnectionRefused(Endpoint),

    #[error("unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("order rejected: {0}")]
    Rejected(String),
}
