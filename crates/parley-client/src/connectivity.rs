//! Connectivity observation.
//!
//! The host platform's online/offline signal enters the client here as a
//! tri-state reading. The source half is fed by platform glue (or tests);
//! the observer half is consumed serially by the session loop. The
//! channel starts at `Unknown`, the cold-start value on which no action
//! is taken.

use tokio::sync::watch;

use parley_shared::Connectivity;

/// Create a linked source/observer pair, initialised to `Unknown`.
pub fn connectivity_channel() -> (ConnectivitySource, ConnectivityObserver) {
    let (tx, rx) = watch::channel(Connectivity::Unknown);
    (ConnectivitySource { tx }, ConnectivityObserver { rx })
}

/// Producer half: platform glue pushes readings through this.
#[derive(Clone)]
pub struct ConnectivitySource {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivitySource {
    pub fn report(&self, reading: Connectivity) {
        // Receivers may all be gone during teardown; that is not an error.
        let _ = self.tx.send(reading);
    }

    /// Convenience for platforms that expose `Option<bool>` directly.
    pub fn report_raw(&self, is_connected: Option<bool>) {
        self.report(Connectivity::from_reading(is_connected));
    }
}

/// Consumer half: yields each reading in order.
pub struct ConnectivityObserver {
    rx: watch::Receiver<Connectivity>,
}

impl ConnectivityObserver {
    pub fn current(&self) -> Connectivity {
        *self.rx.borrow()
    }

    /// Wait for the next reading. `None` once the source is gone.
    pub async fn next(&mut self) -> Option<Connectivity> {
        match self.rx.changed().await {
            Ok(()) => Some(*self.rx.borrow_and_update()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_unknown() {
        let (_source, observer) = connectivity_channel();
        assert_eq!(observer.current(), Connectivity::Unknown);
    }

    #[tokio::test]
    async fn readings_arrive_in_order() {
        let (source, mut observer) = connectivity_channel();

        source.report_raw(Some(true));
        assert_eq!(observer.next().await, Some(Connectivity::Online));

        source.report_raw(Some(false));
        assert_eq!(observer.next().await, Some(Connectivity::Offline));
    }

    #[tokio::test]
    async fn observer_ends_when_source_drops() {
        let (source, mut observer) = connectivity_channel();
        drop(source);
        assert_eq!(observer.next().await, None);
    }
}
