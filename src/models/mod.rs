pub mod rows;
pub mod tables;

pub use rows::{
    AuthRow, BalanceRow, DelegationRow, DeleteRow, DenomTraceRow, IbcChannelRow,
    IbcConnectionRow, PoolRow, SwapRow,
};
pub use tables::Table;
