//! Edge-triggered interrupt dispatch
//!
//! One watcher thread per registered pin. The thread polls the pin's sysfs
//! `value` descriptor for `POLLPRI` (the kernel's edge notification) plus a
//! self-pipe used to stop it; closing descriptors out from under a running
//! `poll` is never done. The pending edge that sysfs reports for the
//! current state at registration time is drained before the thread starts,
//! so callbacks only fire for real transitions.
//!
//! Re-registering a pin swaps the callback in place; the watcher thread and
//! the cached descriptor are reused.

use std::collections::HashMap;
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::fs::FileExt;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use pinwire_core::types::{Edge, Level};
use pinwire_core::SysfsTable;

use crate::attrs::SysfsGpio;
use crate::error::{Result, SysfsError};

type Callback = Box<dyn FnMut() + Send>;

struct Watcher {
    callback: Arc<Mutex<Callback>>,
    stop: OwnedFd,
    handle: Option<JoinHandle<()>>,
}

/// Per-pin interrupt watchers over one sysfs class root, sharing the
/// process-wide descriptor table with the dispatch layer.
pub struct IsrRegistry {
    sysfs: SysfsGpio,
    table: Arc<SysfsTable>,
    watchers: Mutex<HashMap<u32, Watcher>>,
}

impl IsrRegistry {
    /// Registry over `sysfs`, caching descriptors in `table`.
    pub fn new(sysfs: SysfsGpio, table: Arc<SysfsTable>) -> Self {
        IsrRegistry {
            sysfs,
            table,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// The shared descriptor table.
    pub fn table(&self) -> &Arc<SysfsTable> {
        &self.table
    }

    /// Configure the pin's sysfs attributes for `edge` and make sure its
    /// `value` descriptor is cached. [`Edge::Setup`] trusts existing
    /// configuration and only opens the descriptor.
    fn prepare(&self, gpio: u32, edge: Edge) -> Result<Arc<std::fs::File>> {
        if edge != Edge::Setup {
            self.sysfs.export(gpio)?;
            self.sysfs.set_direction(gpio, false)?;
            self.sysfs.set_edge(gpio, edge)?;
        }

        let file = match self.table.get(gpio) {
            Some(file) => file,
            None => {
                let opened = self.sysfs.open_value(gpio)?;
                self.table
                    .insert(gpio, opened)
                    .ok_or(SysfsError::PinOutOfRange { gpio })?
            }
        };

        // Clear the edge the kernel reports for the pin's current state.
        let mut scratch = [0u8; 1];
        let _ = file.read_at(&mut scratch, 0);
        Ok(file)
    }

    /// Register `callback` to run on every configured edge of `gpio` (a
    /// kernel sysfs number). A second registration on the same pin replaces
    /// the callback without restarting the watcher.
    pub fn register(
        &self,
        gpio: u32,
        edge: Edge,
        callback: impl FnMut() + Send + 'static,
    ) -> Result<()> {
        let mut watchers = self.watchers.lock().unwrap();
        if let Some(watcher) = watchers.get(&gpio) {
            if edge != Edge::Setup {
                self.sysfs.set_edge(gpio, edge)?;
            }
            *watcher.callback.lock().unwrap() = Box::new(callback);
            log::debug!("gpio{gpio}: interrupt callback replaced");
            return Ok(());
        }

        let file = self.prepare(gpio, edge)?;
        let callback: Arc<Mutex<Callback>> = Arc::new(Mutex::new(Box::new(callback)));

        let (stop_rx, stop_tx) =
            nix::unistd::pipe().map_err(|e| SysfsError::Interrupt { gpio, source: e.into() })?;

        let thread_cb = Arc::clone(&callback);
        let handle = std::thread::Builder::new()
            .name(format!("isr-{gpio}"))
            .spawn(move || {
                raise_priority();
                watch_loop(gpio, file, stop_rx, thread_cb);
            })
            .map_err(|e| SysfsError::Interrupt { gpio, source: e })?;

        watchers.insert(
            gpio,
            Watcher {
                callback,
                stop: stop_tx,
                handle: Some(handle),
            },
        );
        log::debug!("gpio{gpio}: interrupt watcher started ({edge:?})");
        Ok(())
    }

    /// Stop the watcher for `gpio` and drop its cached descriptor. Returns
    /// whether a watcher existed.
    pub fn unregister(&self, gpio: u32) -> bool {
        let Some(mut watcher) = self.watchers.lock().unwrap().remove(&gpio) else {
            return false;
        };
        let _ = nix::unistd::write(watcher.stop.as_fd(), b"q");
        if let Some(handle) = watcher.handle.take() {
            let _ = handle.join();
        }
        self.table.clear(gpio);
        log::debug!("gpio{gpio}: interrupt watcher stopped");
        true
    }

    /// Pins with an active watcher, sorted.
    pub fn active(&self) -> Vec<u32> {
        let mut pins: Vec<u32> = self.watchers.lock().unwrap().keys().copied().collect();
        pins.sort_unstable();
        pins
    }

    /// Block until the next configured edge on `gpio`, which must already
    /// have its edge attribute set up (via a prior registration or
    /// externally plus [`Edge::Setup`]). Returns the level read after the
    /// edge, or `None` on timeout.
    pub fn wait_for_interrupt(
        &self,
        gpio: u32,
        edge: Edge,
        timeout: Option<Duration>,
    ) -> Result<Option<Level>> {
        let file = self.prepare(gpio, edge)?;

        let poll_timeout = match timeout {
            None => PollTimeout::NONE,
            Some(t) => {
                let ms = t.as_millis().min(i32::MAX as u128) as i32;
                PollTimeout::try_from(ms).unwrap_or(PollTimeout::MAX)
            }
        };

        let mut fds = [PollFd::new(file.as_fd(), PollFlags::POLLPRI)];
        let n = poll(&mut fds, poll_timeout)
            .map_err(|e| SysfsError::Interrupt { gpio, source: e.into() })?;
        if n == 0 {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        file.read_at(&mut buf, 0)
            .map_err(|source| SysfsError::Interrupt { gpio, source })?;
        Ok(Some(Level::from_bit(u32::from(buf[0] != b'0'))))
    }
}

impl Drop for IsrRegistry {
    fn drop(&mut self) {
        let pins: Vec<u32> = self.watchers.lock().unwrap().keys().copied().collect();
        for gpio in pins {
            self.unregister(gpio);
        }
    }
}

enum WatchEvent {
    Edge,
    Shutdown,
}

fn watch_loop(gpio: u32, file: Arc<std::fs::File>, stop: OwnedFd, callback: Arc<Mutex<Callback>>) {
    service_edges(&file, &callback, || next_event(gpio, &file, &stop));
}

/// Block until the next edge notification or a stop request on the
/// self-pipe.
fn next_event(gpio: u32, file: &std::fs::File, stop: &OwnedFd) -> WatchEvent {
    loop {
        let mut fds = [
            PollFd::new(file.as_fd(), PollFlags::POLLPRI),
            PollFd::new(stop.as_fd(), PollFlags::POLLIN),
        ];
        match poll(&mut fds, PollTimeout::NONE) {
            Ok(_) => {}
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => {
                log::warn!("gpio{gpio}: interrupt poll failed: {e}");
                return WatchEvent::Shutdown;
            }
        }

        if fds[1]
            .revents()
            .is_some_and(|r| r.intersects(PollFlags::POLLIN))
        {
            return WatchEvent::Shutdown;
        }
        if fds[0]
            .revents()
            .is_some_and(|r| r.intersects(PollFlags::POLLPRI | PollFlags::POLLERR))
        {
            return WatchEvent::Edge;
        }
    }
}

/// Run the callback once per delivered edge until shutdown.
fn service_edges(
    file: &std::fs::File,
    callback: &Mutex<Callback>,
    mut next: impl FnMut() -> WatchEvent,
) {
    loop {
        match next() {
            WatchEvent::Edge => {
                // Reading from offset zero rearms the edge notification.
                let mut buf = [0u8; 1];
                let _ = file.read_at(&mut buf, 0);
                (callback.lock().unwrap())();
            }
            WatchEvent::Shutdown => return,
        }
    }
}

/// Ask for round-robin realtime scheduling to tighten dispatch latency.
/// Fails without CAP_SYS_NICE, which is fine.
fn raise_priority() {
    let param = libc::sched_param { sched_priority: 55 };
    let rc = unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_RR, &param) };
    if rc != 0 {
        log::trace!("realtime priority unavailable (errno {rc})");
    }
}
