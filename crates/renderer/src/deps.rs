//! Once-only loading of the renderer's heavyweight dependencies.
//!
//! Each [`DependencySlot`] runs its loader at most once. Callers that arrive
//! while the load is running block on the same outcome, and the outcome (value
//! or error) is kept for every later caller. Loads run on a worker thread and
//! are bounded by a timeout.

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};

use crate::compile::ShaderLibrary;
use crate::types::AdapterProfile;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyLoadError {
    #[error("loading {name} timed out after {timeout:?}")]
    Timeout {
        name: &'static str,
        timeout: Duration,
    },
    #[error("loading {name} failed: {reason}")]
    Failed { name: &'static str, reason: String },
}

impl DependencyLoadError {
    pub fn name(&self) -> &'static str {
        match self {
            DependencyLoadError::Timeout { name, .. } | DependencyLoadError::Failed { name, .. } => {
                name
            }
        }
    }
}

pub struct DependencySlot<T> {
    name: &'static str,
    timeout: Duration,
    cell: OnceLock<Result<Arc<T>, DependencyLoadError>>,
}

impl<T> DependencySlot<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self::with_timeout(name, DEFAULT_LOAD_TIMEOUT)
    }

    pub fn with_timeout(name: &'static str, timeout: Duration) -> Self {
        Self {
            name,
            timeout,
            cell: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    pub fn ensure_loaded<F>(&self, load: F) -> Result<Arc<T>, DependencyLoadError>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        self.cell.get_or_init(|| self.run_load(load)).clone()
    }

    fn run_load<F>(&self, load: F) -> Result<Arc<T>, DependencyLoadError>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let name = self.name;
        let (tx, rx) = bounded(1);
        thread::Builder::new()
            .name(format!("load-{name}"))
            .spawn(move || {
                let _ = tx.send(load());
            })
            .map_err(|err| DependencyLoadError::Failed {
                name,
                reason: format!("failed to spawn loader thread: {err}"),
            })?;

        let outcome = match rx.recv_timeout(self.timeout) {
            Ok(Ok(value)) => Ok(Arc::new(value)),
            Ok(Err(err)) => Err(DependencyLoadError::Failed {
                name,
                reason: format!("{err:#}"),
            }),
            Err(RecvTimeoutError::Timeout) => Err(DependencyLoadError::Timeout {
                name,
                timeout: self.timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(DependencyLoadError::Failed {
                name,
                reason: "loader exited without a result".into(),
            }),
        };

        match &outcome {
            Ok(_) => tracing::debug!(dependency = name, "dependency loaded"),
            Err(err) => tracing::error!(dependency = name, error = %err, "dependency load failed"),
        }
        outcome
    }
}

/// wgpu instance and adapter shared by every surface the renderer creates.
pub struct GpuBackend {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub profile: AdapterProfile,
}

impl GpuBackend {
    pub fn request() -> anyhow::Result<Self> {
        use anyhow::Context;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;
        let profile = AdapterProfile::from_wgpu(&adapter.get_info());
        tracing::debug!(
            name = %profile.name,
            backend = ?profile.backend,
            device_type = ?profile.device_type,
            "selected GPU adapter"
        );
        Ok(Self {
            instance,
            adapter,
            profile,
        })
    }
}

/// Holds the guarded dependencies for one renderer instance.
pub struct EngineContext {
    pub gpu: DependencySlot<GpuBackend>,
    pub shaders: DependencySlot<ShaderLibrary>,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_TIMEOUT)
    }
}

impl EngineContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            gpu: DependencySlot::with_timeout("gpu backend", timeout),
            shaders: DependencySlot::with_timeout("slide shaders", timeout),
        }
    }

    pub fn gpu(&self) -> Result<Arc<GpuBackend>, DependencyLoadError> {
        self.gpu.ensure_loaded(GpuBackend::request)
    }

    pub fn shaders(&self) -> Result<Arc<ShaderLibrary>, DependencyLoadError> {
        self.shaders
            .ensure_loaded(|| ShaderLibrary::load().map_err(anyhow::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn concurrent_callers_share_one_load() {
        let slot: DependencySlot<u32> = DependencySlot::new("counter");
        let calls = Arc::new(AtomicUsize::new(0));

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let calls = Arc::clone(&calls);
                    let slot = &slot;
                    scope.spawn(move || {
                        slot.ensure_loaded(move || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok(7)
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("caller thread"))
                .collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = results[0].clone().expect("loaded");
        for result in &results {
            let value = result.clone().expect("loaded");
            assert!(Arc::ptr_eq(&first, &value));
        }
        assert!(slot.is_loaded());
    }

    #[test]
    fn slow_load_times_out_and_stays_failed() {
        let slot: DependencySlot<u32> =
            DependencySlot::with_timeout("sluggish", Duration::from_millis(20));
        let err = slot
            .ensure_loaded(|| {
                thread::sleep(Duration::from_millis(300));
                Ok(1)
            })
            .unwrap_err();
        assert_eq!(
            err,
            DependencyLoadError::Timeout {
                name: "sluggish",
                timeout: Duration::from_millis(20)
            }
        );

        let again = slot.ensure_loaded(|| Ok(2)).unwrap_err();
        assert_eq!(again.name(), "sluggish");
        assert!(!slot.is_loaded());
    }

    #[test]
    fn loader_error_is_reported_with_name() {
        let slot: DependencySlot<u32> = DependencySlot::new("broken");
        let err = slot
            .ensure_loaded(|| Err(anyhow::anyhow!("no device")))
            .unwrap_err();
        assert!(matches!(
            &err,
            DependencyLoadError::Failed { name: "broken", reason } if reason.contains("no device")
        ));
    }

    #[test]
    fn shader_slot_loads_bundled_library() {
        let context = EngineContext::default();
        assert!(context.shaders().is_ok());
        assert!(context.shaders.is_loaded());
    }
}
