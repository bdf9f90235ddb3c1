use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::runtime::Runtime;

/// Creates a lightweight single-threaded Tokio runtime
///
/// Uses current_thread scheduler to avoid thread explosion: every background
/// worker owns its own runtime, so a multi-threaded one per worker would
/// spawn far more threads than the app needs.
///
/// Returns `Ok(Runtime)` if successful, or `Err(String)` with error message
pub fn create_runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create runtime: {}", e))
}

/// Safely locks a mutex with poisoning recovery
///
/// If the mutex is poisoned (previous holder panicked), this function
/// will recover by extracting the inner value. Used for playback metrics and
/// stream buffers where a partially written value is still usable.
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("[{}] Mutex poisoned, recovering from panic", context);
            poisoned.into_inner()
        }
    }
}

// ============================================================================
// ATOMIC F64 HELPERS - Lock-free float storage using bit-casting
// ============================================================================

/// Store an f64 value in an AtomicU64 (playback position published to the UI)
pub fn store_f64_atomic(atomic: &AtomicU64, value: f64) {
    atomic.store(value.to_bits(), Ordering::Relaxed);
}

/// Load an f64 value from an AtomicU64
pub fn load_f64_atomic(atomic: &AtomicU64) -> f64 {
    f64::from_bits(atomic.load(Ordering::Relaxed))
}
