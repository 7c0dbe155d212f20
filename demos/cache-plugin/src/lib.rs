//! Read-ahead cache component shipped as a storeplug plugin.
//!
//! Build with `cargo build -p storeplug-cache-plugin` and point the host at
//! the resulting library:
//!
//! ```text
//! STOREPLUG_PLUGIN_PATH=target/debug/libstoreplug_cache_plugin.so storeplug load
//! ```
//!
//! A plugin links its own copies of its dependencies. Events emitted here
//! through `tracing` would go to the plugin's dispatcher, which has no
//! subscriber, and never reach the host's logs. Report state through return
//! values instead.

use storeplug::component::{Component, ComponentPriority};
use storeplug::Result;

/// Registry key of this component.
pub const COMPONENT_NAME: &str = "read_ahead_cache";

const DEFAULT_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Caches the blocks following each read.
#[derive(Debug)]
pub struct ReadAheadCache {
    block_size: usize,
    running: bool,
}

impl Default for ReadAheadCache {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            running: false,
        }
    }
}

impl ReadAheadCache {
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Component for ReadAheadCache {
    fn name(&self) -> &str {
        COMPONENT_NAME
    }

    fn priority(&self) -> ComponentPriority {
        ComponentPriority::LevelMid
    }

    fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }
}

fn new_read_ahead_cache() -> Box<dyn Component> {
    Box::new(ReadAheadCache::default())
}

storeplug::export_component!(COMPONENT_NAME, new_read_ahead_cache);
