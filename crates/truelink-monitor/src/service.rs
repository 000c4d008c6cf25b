use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};
use truelink_netlink::StationSource;

use crate::monitor::{LinkMonitor, TelemetrySnapshot};
use crate::targets::T_MONITOR;
use crate::topology::TopologyProvider;

const STOP_POLL: Duration = Duration::from_millis(50);

/// Drives a [`LinkMonitor`] from a background thread: topology check,
/// then a tick, once per polling interval.
pub struct MonitorService<S: StationSource + Send + 'static> {
    monitor: Arc<Mutex<LinkMonitor<S>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<S: StationSource + Send + 'static> MonitorService<S> {
    pub fn spawn<P: TopologyProvider + 'static>(monitor: LinkMonitor<S>, mut topology: P) -> Self {
        let interval = monitor.update_interval();
        let monitor = Arc::new(Mutex::new(monitor));
        let stop = Arc::new(AtomicBool::new(false));

        let monitor_clone = monitor.clone();
        let stop_clone = stop.clone();

        let handle = thread::spawn(move || {
            debug!(target: T_MONITOR, "monitor thread started interval={:?}", interval);
            while !stop_clone.load(Ordering::Relaxed) {
                let started = Instant::now();
                let current = topology.current();
                match monitor_clone.lock() {
                    Ok(mut guard) => poll_once(&mut guard, current),
                    Err(err) => {
                        warn!(target: T_MONITOR, "monitor mutex poisoned: {}", err);
                        break;
                    }
                }
                sleep_until(started + interval, &stop_clone);
            }
            debug!(target: T_MONITOR, "monitor thread stopped");
        });

        Self {
            monitor,
            stop,
            handle: Some(handle),
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.monitor
            .lock()
            .map(|guard| guard.snapshot())
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop polling and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(target: T_MONITOR, "monitor thread panicked");
            }
        }
    }
}

impl<S: StationSource + Send + 'static> Drop for MonitorService<S> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// A fresh connection already ticks inside `on_topology`; only an
/// established one needs the explicit tick.
fn poll_once<S: StationSource>(monitor: &mut LinkMonitor<S>, topology: crate::topology::Topology) {
    let was_connected = monitor.is_connected();
    if monitor.on_topology(topology) && was_connected {
        monitor.tick();
    }
}

fn sleep_until(deadline: Instant, stop: &AtomicBool) {
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(STOP_POLL));
    }
}
