use std::sync::Once;

/// Installs a `tracing` subscriber that writes through the test harness. Filter with `RUST_LOG`.
pub fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}
