//! Subscriber installation for binaries and tests.
//!
//! Library crates only emit events; nothing is printed until a subscriber
//! is installed here.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Filter variable checked first; `RUST_LOG` is the fallback.
pub const LOG_ENV: &str = "QUILL_LOG";

/// When set, events are printed as an indented span tree.
pub const TREE_ENV: &str = "QUILL_LOG_TREE";

/// Install the global subscriber once.
///
/// Does nothing unless `QUILL_LOG` or `RUST_LOG` is set, e.g.
/// `QUILL_LOG=quill_parse=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let directives = std::env::var(LOG_ENV).or_else(|_| std::env::var("RUST_LOG"));
        let Ok(directives) = directives else {
            return;
        };
        let filter = EnvFilter::new(directives);

        let (flat, tree) = if std::env::var_os(TREE_ENV).is_some() {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true);
            (None, Some(tree))
        } else {
            (Some(fmt::layer().with_target(true).with_level(true)), None)
        };

        // A host may have installed its own subscriber already.
        let _ = tracing_subscriber::registry()
            .with(flat)
            .with(tree)
            .with(filter)
            .try_init();
    });
}
