//! Constructor-wired replacement for the original's module-level
//! singletons (config, logger, arena) — spec §9 "Global singletons".
//! `Context` is built once at startup and threaded through the match
//! loop and RPC handlers; no process-wide mutable state exists outside
//! it.

use std::sync::Arc;

use crate::config::Config;

/// Everything the match loop and RPC surface need, built once in `main`.
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Context { config: Arc::new(config) }
    }
}
