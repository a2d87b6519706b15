pub mod convert;
pub mod error;
pub mod gateway;
pub mod paper;
pub mod session;
pub mod snapshot;
pub mod types;

pub use convert::bars_to_eod;
pub use error::GatewayError;
pub use gateway::{Gateway, GatewayResult};
pub use paper::{PaperBook, PaperGateway, DEFAULT_PAPER_ACCOUNT, DEFAULT_PAPER_CASH};
pub use session::Session;
pub use snapshot::{jump_table, IntradayJump, JumpStatus, DEFAULT_JUMP_THRESHOLD};
pub use types::{
    AccountValue, Action, Bar, ClientId, Contract, Endpoint, OpenOrder, Order, OrderId,
    OrderReceipt, OrderStatus, OrderType, Position, Right, SecType, Snapshot, TimeInForce,
};
