//! Stock Config

use std::num::NonZeroUsize;

use clap::Args;
use stocksync_app::{domain::stock::OverdraftPolicy, realtime::DEFAULT_SUPERVISOR_CHANNEL};

/// Stock movement and alert routing settings.
#[derive(Debug, Args)]
pub struct StockConfig {
    /// What to do with an OUT movement larger than the stock on hand (clamp, reject)
    #[arg(long, env = "OVERDRAFT_POLICY", default_value = "clamp")]
    pub overdraft_policy: OverdraftPolicy,

    /// Channel that receives low stock alerts when it has members
    #[arg(long, env = "SUPERVISOR_CHANNEL", default_value = DEFAULT_SUPERVISOR_CHANNEL)]
    pub supervisor_channel: String,

    /// Events a real-time connection may have queued before it is disconnected
    #[arg(long, env = "BROADCAST_QUEUE_CAPACITY", default_value = "256")]
    pub broadcast_queue_capacity: NonZeroUsize,
}
