use std::mem::take;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::sync::{Mutex, Once, OnceLock};
use std::thread::spawn;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Exit status after Ctrl-C
const INTERRUPTED_EXIT_CODE: i32 = 130;

type CleanupCallback = Box<dyn Fn() + Send + 'static>;
static CALLBACKS: OnceLock<Mutex<Vec<Option<CleanupCallback>>>> = OnceLock::new();
static SET_HANDLER: Once = Once::new();
static SHUTDOWN_STARTED: AtomicBool = AtomicBool::new(false);

fn ensure_handlers() {
    SET_HANDLER.call_once(|| {
        if let Err(e) = ctrlc::set_handler(move || {
            run_shutdown();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }) {
            debug!(error = %e, "could not install interrupt handler");
        }
    });
}

fn callbacks() -> std::sync::MutexGuard<'static, Vec<Option<CleanupCallback>>> {
    let m = CALLBACKS.get_or_init(|| Mutex::new(Vec::new()));
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Registers a callback run on interrupt; returns its slot id
pub fn register_cleanup<F>(f: F) -> usize
where
    F: Fn() + Send + 'static,
{
    ensure_handlers();

    let mut guard = callbacks();
    guard.push(Some(Box::new(f)));

    guard.len() - 1
}

/// Drops a callback once its resource was released normally
pub fn unregister_cleanup(id: usize) -> bool {
    let mut guard = callbacks();
    match guard.get_mut(id) {
        Some(slot) => slot.take().is_some(),
        None => false,
    }
}

/// Runs every registered callback, bounded by [`SHUTDOWN_TIMEOUT`]
pub fn run_shutdown() {
    if SHUTDOWN_STARTED.swap(true, Ordering::SeqCst) {
        return;
    }

    let pending: Vec<CleanupCallback> = take(&mut *callbacks()).into_iter().flatten().collect();
    if pending.is_empty() {
        return;
    }

    let (tx, rx) = channel::<usize>();

    let total = pending.len();
    let deadline = Instant::now() + SHUTDOWN_TIMEOUT;

    for (i, cb) in pending.into_iter().enumerate() {
        let tx = tx.clone();
        spawn(move || {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(cb));
            let _ = tx.send(i);
        });
    }

    drop(tx);

    let mut completed = 0;
    while completed < total {
        let now = Instant::now();
        if now >= deadline {
            break;
        }

        match rx.recv_timeout(deadline - now) {
            Ok(_) => completed += 1,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if completed < total {
        warn!(completed, total, "cleanup did not finish before shutdown");
    }
}
