use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{NodeRef, Payload};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
    debug!("RUST_LOG={:?}", env::var("RUST_LOG").ok());
}

/// The tree used throughout the tests:
///
/// ```text
/// A
/// ├── B
/// │   ├── D
/// │   └── E
/// └── C
///     └── F
/// ```
///
/// Returns the nodes in the order `[A, B, C, D, E, F]`.
pub fn sample_tree() -> [NodeRef; 6] {
    let a = NodeRef::new_root("A", Payload::new());
    let b = a.add_child("B", Payload::new()).expect("add B");
    let c = a.add_child("C", Payload::new()).expect("add C");
    let d = b.add_child("D", Payload::new()).expect("add D");
    let e = b.add_child("E", Payload::new()).expect("add E");
    let f = c.add_child("F", Payload::new()).expect("add F");
    [a, b, c, d, e, f]
}
