//! Protobuf payloads stored by the Cosmos SDK modules we index.
//!
//! Only the fields we read are declared; prost skips unknown fields.

pub const BASE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.BaseAccount";
pub const MODULE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.ModuleAccount";

// ─── cosmos.base / google.protobuf ──────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Coin {
    #[prost(string, tag = "1")]
    pub denom: String,
    #[prost(string, tag = "2")]
    pub amount: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

// ─── x/auth ─────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BaseAccount {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(message, optional, tag = "2")]
    pub pub_key: Option<Any>,
    #[prost(uint64, tag = "3")]
    pub account_number: u64,
    #[prost(uint64, tag = "4")]
    pub sequence: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModuleAccount {
    #[prost(message, optional, tag = "1")]
    pub base_account: Option<BaseAccount>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, repeated, tag = "3")]
    pub permissions: Vec<String>,
}

// ─── x/staking ──────────────────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Delegation {
    #[prost(string, tag = "1")]
    pub delegator_address: String,
    #[prost(string, tag = "2")]
    pub validator_address: String,
    /// sdk.Dec, serialized as an integer scaled by 10^18.
    #[prost(string, tag = "3")]
    pub shares: String,
}

// ─── ibc.core.connection ────────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectionEnd {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(message, repeated, tag = "2")]
    pub versions: Vec<Version>,
    #[prost(enumeration = "ConnectionState", tag = "3")]
    pub state: i32,
    #[prost(message, optional, tag = "4")]
    pub counterparty: Option<ConnectionCounterparty>,
    #[prost(uint64, tag = "5")]
    pub delay_period: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Version {
    #[prost(string, tag = "1")]
    pub identifier: String,
    #[prost(string, repeated, tag = "2")]
    pub features: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectionCounterparty {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(string, tag = "2")]
    pub connection_id: String,
    #[prost(message, optional, tag = "3")]
    pub prefix: Option<MerklePrefix>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MerklePrefix {
    #[prost(bytes = "vec", tag = "1")]
    pub key_prefix: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ConnectionState {
    UninitializedUnspecified = 0,
    Init = 1,
    Tryopen = 2,
    Open = 3,
}

impl ConnectionState {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ConnectionState::UninitializedUnspecified => "STATE_UNINITIALIZED_UNSPECIFIED",
            ConnectionState::Init => "STATE_INIT",
            ConnectionState::Tryopen => "STATE_TRYOPEN",
            ConnectionState::Open => "STATE_OPEN",
        }
    }
}

// ─── ibc.core.channel ───────────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Channel {
    #[prost(enumeration = "ChannelState", tag = "1")]
    pub state: i32,
    #[prost(enumeration = "Order", tag = "2")]
    pub ordering: i32,
    #[prost(message, optional, tag = "3")]
    pub counterparty: Option<ChannelCounterparty>,
    #[prost(string, repeated, tag = "4")]
    pub connection_hops: Vec<String>,
    #[prost(string, tag = "5")]
    pub version: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelCounterparty {
    #[prost(string, tag = "1")]
    pub port_id: String,
    #[prost(string, tag = "2")]
    pub channel_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ChannelState {
    UninitializedUnspecified = 0,
    Init = 1,
    Tryopen = 2,
    Open = 3,
    Closed = 4,
}

impl ChannelState {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ChannelState::UninitializedUnspecified => "STATE_UNINITIALIZED_UNSPECIFIED",
            ChannelState::Init => "STATE_INIT",
            ChannelState::Tryopen => "STATE_TRYOPEN",
            ChannelState::Open => "STATE_OPEN",
            ChannelState::Closed => "STATE_CLOSED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Order {
    NoneUnspecified = 0,
    Unordered = 1,
    Ordered = 2,
}

impl Order {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Order::NoneUnspecified => "ORDER_NONE_UNSPECIFIED",
            Order::Unordered => "ORDER_UNORDERED",
            Order::Ordered => "ORDER_ORDERED",
        }
    }
}

// ─── ibc.applications.transfer ──────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DenomTrace {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(string, tag = "2")]
    pub base_denom: String,
}

// ─── tendermint.liquidity ───────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Pool {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(uint32, tag = "2")]
    pub type_id: u32,
    #[prost(string, repeated, tag = "3")]
    pub reserve_coin_denoms: Vec<String>,
    #[prost(string, tag = "4")]
    pub reserve_account_address: String,
    #[prost(string, tag = "5")]
    pub pool_coin_denom: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SwapMsgState {
    #[prost(int64, tag = "1")]
    pub msg_height: i64,
    #[prost(uint64, tag = "2")]
    pub msg_index: u64,
    #[prost(bool, tag = "3")]
    pub executed: bool,
    #[prost(bool, tag = "4")]
    pub succeeded: bool,
    #[prost(bool, tag = "5")]
    pub to_be_deleted: bool,
    #[prost(int64, tag = "6")]
    pub order_expiry_height: i64,
    #[prost(message, optional, tag = "7")]
    pub exchanged_offer_coin: Option<Coin>,
    #[prost(message, optional, tag = "8")]
    pub remaining_offer_coin: Option<Coin>,
    #[prost(message, optional, tag = "9")]
    pub reserved_offer_coin_fee: Option<Coin>,
    #[prost(message, optional, tag = "10")]
    pub msg: Option<MsgSwapWithinBatch>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgSwapWithinBatch {
    #[prost(string, tag = "1")]
    pub swap_requester_address: String,
    #[prost(uint64, tag = "2")]
    pub pool_id: u64,
    #[prost(uint32, tag = "3")]
    pub swap_type_id: u32,
    #[prost(message, optional, tag = "4")]
    pub offer_coin: Option<Coin>,
    #[prost(string, tag = "5")]
    pub demand_coin_denom: String,
    #[prost(message, optional, tag = "6")]
    pub offer_coin_fee: Option<Coin>,
    #[prost(string, tag = "7")]
    pub order_price: String,
}
