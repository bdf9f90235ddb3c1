use std::future::Future;
use std::pin::Pin;
use std::thread::JoinHandle;

/// Type alias for async task results
pub type AsyncTaskResult<T> = Result<T, String>;

/// Type alias for boxed async tasks
pub type AsyncTask<T> = Pin<Box<dyn Future<Output = AsyncTaskResult<T>> + Send + 'static>>;

/// Spawns a background thread that runs an async task and sends the result via a channel
///
/// The UI polls the receiver with `try_recv` once per frame. The thread exits
/// after sending the result; a dropped receiver is not an error.
///
/// # Example
/// ```ignore
/// let (tx, rx) = std::sync::mpsc::channel();
/// spawn_and_send(
///     move || Box::pin(async move {
///         api::search_tracks(&query, 0, 20).await.map_err(|e| e.to_string())
///     }),
///     tx,
/// );
/// // Later: if let Ok(result) = rx.try_recv() { ... }
/// ```
pub fn spawn_and_send<F, T>(
    task_factory: F,
    tx: std::sync::mpsc::Sender<AsyncTaskResult<T>>,
) -> JoinHandle<()>
where
    F: FnOnce() -> AsyncTask<T> + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(move || {
        let rt = match crate::utils::error_handling::create_runtime() {
            Ok(r) => r,
            Err(e) => {
                log::error!("[AsyncHelper] Failed to create runtime: {}", e);
                let _ = tx.send(Err(e));
                return;
            }
        };

        let result = rt.block_on(task_factory());
        let _ = tx.send(result);
    })
}

/// Fire-and-forget spawn for tasks where you don't need the result
///
/// # Example
/// ```ignore
/// spawn_fire_and_forget(move || {
///     Box::pin(async move {
///         downloads::download_track(&track).await.map(|_| ())
///     })
/// });
/// ```
pub fn spawn_fire_and_forget<F, T>(task_factory: F)
where
    F: FnOnce() -> AsyncTask<T> + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(move || {
        let rt = match crate::utils::error_handling::create_runtime() {
            Ok(r) => r,
            Err(e) => {
                log::error!("[AsyncHelper] Failed to create runtime: {}", e);
                return;
            }
        };

        if let Err(e) = rt.block_on(task_factory()) {
            log::warn!("[AsyncHelper] Background task failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn result_is_delivered_through_channel() {
        let (tx, rx) = channel();
        spawn_and_send(move || Box::pin(async move { Ok::<_, String>(21 * 2) }), tx);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn errors_are_delivered_too() {
        let (tx, rx) = channel::<AsyncTaskResult<()>>();
        spawn_and_send(move || Box::pin(async move { Err("boom".to_string()) }), tx);
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result, Err("boom".to_string()));
    }
}
