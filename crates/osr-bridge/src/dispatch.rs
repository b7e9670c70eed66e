//! Hand-off from foreign threads to the host UI context.
//!
//! Paint and cursor callbacks arrive on the engine's thread. They never touch
//! the GPU pipeline or the toolkit directly; they post a request and return.

use crate::engine::CursorType;
use crossbeam_channel::{Receiver, Sender, TrySendError, unbounded};
use tracing::debug;

/// Work the UI context should perform on the bridge's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Run the display callback soon
    Redraw,
    /// Change the cursor shown over the surface
    SetCursor(CursorType),
}

/// Posts requests to the UI context without blocking
pub trait HostDispatcher: Send + Sync {
    fn dispatch(&self, request: HostRequest);
}

/// Channel-backed dispatcher; the UI loop drains [`HostRequests`]
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: Sender<HostRequest>,
}

/// Receiving end of a [`ChannelDispatcher`]
#[derive(Debug)]
pub struct HostRequests {
    rx: Receiver<HostRequest>,
}

impl ChannelDispatcher {
    pub fn new() -> (Self, HostRequests) {
        let (tx, rx) = unbounded();
        (Self { tx }, HostRequests { rx })
    }
}

impl HostDispatcher for ChannelDispatcher {
    fn dispatch(&self, request: HostRequest) {
        if let Err(TrySendError::Disconnected(request)) = self.tx.try_send(request) {
            debug!("UI context gone, dropping {:?}", request);
        }
    }
}

impl HostRequests {
    /// Drain pending requests (non-blocking).
    ///
    /// Consecutive redraws collapse into one; only the latest cursor survives.
    pub fn drain(&self) -> Vec<HostRequest> {
        let mut redraw = false;
        let mut cursor = None;
        while let Ok(request) = self.rx.try_recv() {
            match request {
                HostRequest::Redraw => redraw = true,
                HostRequest::SetCursor(c) => cursor = Some(c),
            }
        }

        let mut out = Vec::with_capacity(2);
        if let Some(c) = cursor {
            out.push(HostRequest::SetCursor(c));
        }
        if redraw {
            out.push(HostRequest::Redraw);
        }
        out
    }

    pub fn receiver(&self) -> &Receiver<HostRequest> {
        &self.rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_coalesces() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        dispatcher.dispatch(HostRequest::Redraw);
        dispatcher.dispatch(HostRequest::SetCursor(CursorType::Hand));
        dispatcher.dispatch(HostRequest::Redraw);
        dispatcher.dispatch(HostRequest::SetCursor(CursorType::Text));

        assert_eq!(
            requests.drain(),
            vec![HostRequest::SetCursor(CursorType::Text), HostRequest::Redraw]
        );
        assert!(requests.drain().is_empty());
    }

    #[test]
    fn test_dispatch_from_foreign_thread() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        thread::spawn(move || dispatcher.dispatch(HostRequest::Redraw))
            .join()
            .unwrap();
        assert_eq!(requests.drain(), vec![HostRequest::Redraw]);
    }

    #[test]
    fn test_dispatch_after_receiver_dropped() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        drop(requests);
        dispatcher.dispatch(HostRequest::Redraw);
    }
}
