// Input activity detection shared between the engine and the hook callback.
//
// The hook callback runs outside the engine's control, so everything it can
// reach lives in `ActivityGate`: the overlay state as an atomic (read only
// from the callback), the single-fire latch, and the sending half of the
// channel the engine drains. The callback never touches windows or engine
// fields.

use crate::error::Result;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Overlay lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OverlayState {
    Hidden = 0,
    FadingIn = 1,
    WaitingInput = 2,
    FadingOut = 3,
}

impl OverlayState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => OverlayState::FadingIn,
            2 => OverlayState::WaitingInput,
            3 => OverlayState::FadingOut,
            _ => OverlayState::Hidden,
        }
    }
}

/// Message sent from the detector to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity;

type Waker = Box<dyn Fn() + Send + Sync>;

/// Cross-context state read by the observation callback.
pub struct ActivityGate {
    state: AtomicU8,
    latch: AtomicBool,
    sender: Sender<Activity>,
    waker: Option<Waker>,
}

impl ActivityGate {
    /// Returns the gate and the receiving end the engine drains.
    pub fn channel() -> (Self, Receiver<Activity>) {
        let (sender, receiver) = mpsc::channel();
        let gate = Self {
            state: AtomicU8::new(OverlayState::Hidden as u8),
            latch: AtomicBool::new(false),
            sender,
            waker: None,
        };
        (gate, receiver)
    }

    /// Called after every successful send so an idle event loop gets a
    /// chance to drain the channel (e.g. by posting a window message).
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Box::new(waker));
        self
    }

    pub fn state(&self) -> OverlayState {
        OverlayState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: OverlayState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn latched(&self) -> bool {
        self.latch.load(Ordering::Acquire)
    }

    pub(crate) fn reset_latch(&self) {
        self.latch.store(false, Ordering::Release);
    }

    /// Entry point for the observation callback.
    ///
    /// Returns `true` only for the single event that flipped the latch.
    /// Never blocks: a closed channel just drops the notification.
    pub fn notify_input(&self) -> bool {
        if self.state() != OverlayState::WaitingInput {
            return false;
        }
        if self.latch.swap(true, Ordering::AcqRel) {
            return false;
        }
        if self.sender.send(Activity).is_ok() {
            if let Some(wake) = &self.waker {
                wake();
            }
        }
        true
    }
}

/// Process-wide keyboard/pointer observation.
///
/// `arm` installs observation and clears the latch; `disarm` removes it and
/// clears the latch. Both must be safe to call repeatedly.
pub trait InputDetector {
    fn arm(&mut self, gate: &Arc<ActivityGate>) -> Result<()>;
    fn disarm(&mut self, gate: &Arc<ActivityGate>);
    fn is_armed(&self) -> bool;
}
