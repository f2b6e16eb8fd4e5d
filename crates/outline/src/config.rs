//! Outline configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Default quiescence window before a background refresh.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Quiescence window used by [`OutlineConfig::for_tests`].
pub const TEST_DEBOUNCE_MS: u64 = 10;

/// Settings read by every symbol cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineConfig {
	/// Publish the current function name for the status line and refresh symbols on edits.
	#[serde(default)]
	pub auto_update_current_function: bool,
	/// Short display labels keyed by lower-cased kind name (e.g. `"method" => "m"`).
	#[serde(default)]
	pub kind_labels: HashMap<String, String>,
	/// Debounce window for background refreshes, in milliseconds.
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE_MS
}

impl Default for OutlineConfig {
	fn default() -> Self {
		Self {
			auto_update_current_function: false,
			kind_labels: HashMap::new(),
			debounce_ms: default_debounce_ms(),
		}
	}
}

impl OutlineConfig {
	/// Configuration with the short test debounce window.
	pub fn for_tests() -> Self {
		Self {
			debounce_ms: TEST_DEBOUNCE_MS,
			..Self::default()
		}
	}

	/// Decodes a settings object. Missing fields take their defaults.
	pub fn from_settings(settings: &Value) -> Result<Self> {
		Ok(Self::deserialize(settings)?)
	}

	/// Debounce window as a [`Duration`].
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Enables or disables status-line publishing.
	pub fn auto_update(mut self, enabled: bool) -> Self {
		self.auto_update_current_function = enabled;
		self
	}

	/// Sets the label for a kind name. The name is lower-cased.
	pub fn label(mut self, kind: &str, label: impl Into<String>) -> Self {
		self.kind_labels.insert(kind.to_ascii_lowercase(), label.into());
		self
	}
}

/// Process-wide configuration handle.
///
/// Readers get the latest published [`OutlineConfig`] without locking.
#[derive(Debug, Clone)]
pub struct SharedConfig {
	snap: Arc<ArcSwap<OutlineConfig>>,
}

impl Default for SharedConfig {
	fn default() -> Self {
		Self::new(OutlineConfig::default())
	}
}

impl SharedConfig {
	/// Creates a handle holding `config`.
	pub fn new(config: OutlineConfig) -> Self {
		Self {
			snap: Arc::new(ArcSwap::from_pointee(config)),
		}
	}

	/// Current configuration.
	pub fn load(&self) -> Arc<OutlineConfig> {
		self.snap.load_full()
	}

	/// Publishes a new configuration to every holder of this handle.
	pub fn store(&self, config: OutlineConfig) {
		self.snap.store(Arc::new(config));
	}
}
