use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Sender};

/// Background thread that calls `on_tick` every `interval` until shut down.
///
/// Shutdown is synchronous: once [`Ticker::shutdown`] (or `Drop`) returns the
/// thread has been joined and no further callbacks run.
pub(crate) struct Ticker {
    shutdown: Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<F>(name: &str, interval: Duration, mut on_tick: F) -> std::io::Result<Self>
    where
        F: FnMut(Instant) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let handle = thread::Builder::new().name(name.into()).spawn(move || {
            let ticks = tick(interval);
            loop {
                select! {
                    recv(shutdown_rx) -> _ => break,
                    recv(ticks) -> msg => match msg {
                        Ok(at) => on_tick(at),
                        Err(_) => break,
                    },
                }
            }
        })?;

        Ok(Self {
            shutdown: shutdown_tx,
            join_handle: Some(handle),
        })
    }

    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.shutdown.try_send(());
            if handle.join().is_err() {
                tracing::warn!("ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
