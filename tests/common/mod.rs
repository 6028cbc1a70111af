//! Integration test common infrastructure.

use std::sync::Arc;

use slirc_ignore::{
    IgnoreLevel, IgnoreLevels, IgnoreStore, InboundEvent, InboundPolicy, NullDirectory,
};

/// Initialize tracing for test debugging; honors `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Policy over `store` with no learned-hostmask directory.
#[allow(dead_code)]
pub fn policy_over(store: Arc<IgnoreStore>) -> InboundPolicy {
    InboundPolicy::new(store, Arc::new(NullDirectory))
}

/// A plain public channel message.
#[allow(dead_code)]
pub fn channel_msg<'a>(
    server_id: &'a str,
    nick: &'a str,
    channel: &'a str,
    text: &'a str,
) -> InboundEvent<'a> {
    InboundEvent {
        server_id,
        sender_nick: nick,
        sender_hostmask: None,
        ctcp: false,
        kinds: IgnoreLevels::from(IgnoreLevel::Public),
        channel: Some(channel),
        text: Some(text),
    }
}

/// A plain private message.
#[allow(dead_code)]
pub fn private_msg<'a>(server_id: &'a str, nick: &'a str, text: &'a str) -> InboundEvent<'a> {
    InboundEvent {
        server_id,
        sender_nick: nick,
        sender_hostmask: None,
        ctcp: false,
        kinds: IgnoreLevels::from(IgnoreLevel::Msgs),
        channel: None,
        text: Some(text),
    }
}
