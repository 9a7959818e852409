pub mod errors;
pub mod glft;
pub(crate) mod timings;
pub mod types;

pub use errors::{GlftError, Result};
pub use glft::{GlftConfig, GlftStrategy};
pub use types::{OrderId, OrderStatus, PublicTrade, RestingOrder, Side, TimeInForce};
