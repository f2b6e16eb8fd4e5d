use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

/// Returns the ambient runtime handle, or the lazily built fallback runtime when called from
/// outside a runtime.
fn runtime_handle() -> Option<tokio::runtime::Handle> {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return Some(handle);
	}

	static FALLBACK_RT: OnceLock<Option<tokio::runtime::Runtime>> = OnceLock::new();
	let runtime = FALLBACK_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("symbol-outline")
			.build()
			.map_err(|err| tracing::warn!(error = %err, "failed to build fallback outline runtime"))
			.ok()
	});
	runtime.as_ref().map(|rt| rt.handle().clone())
}

/// Spawns background outline work.
pub(crate) fn spawn_background<F>(name: &'static str, fut: F) -> Option<JoinHandle<()>>
where
	F: Future<Output = ()> + Send + 'static,
{
	let handle = runtime_handle()?;
	tracing::trace!(task = name, "outline.spawn");
	Some(handle.spawn(fut))
}
