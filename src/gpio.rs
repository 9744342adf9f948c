//! GPIO capability traits.
//!
//! The core never touches pins directly; it calls through these narrow
//! interfaces. Implementations own the pin role policy: a pin is claimed
//! as exactly one of output or button input, and claiming it in the other
//! role is an [`Error::Config`].
//!
//! [`MockGpio`] is an in-memory implementation for tests and for running
//! the core on hosts without scanner hardware.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Callback invoked from the interrupt context when a button is released.
///
/// Runs on a foreign thread; it must not block.
pub type ButtonCallback = Box<dyn Fn() + Send + Sync>;

/// Digital output capability (step/direction/enable pins).
pub trait DigitalOutput: Send + Sync {
    /// Claim the given pins as outputs, driven low initially.
    ///
    /// Claiming a pin already claimed as a button input fails with
    /// [`Error::Config`]. Re-initializing an output pin is allowed.
    fn initialize_outputs(&self, pins: &[u8]) -> Result<()>;

    /// Drive an output pin high or low.
    fn set(&self, pin: u8, high: bool) -> Result<()>;
}

/// Debounced digital input capability (endstop switches).
pub trait DigitalInput: Send + Sync {
    /// Claim a pin as a debounced button input.
    ///
    /// Claiming a pin already claimed as an output fails with
    /// [`Error::Config`].
    fn initialize_button(&self, pin: u8, pull_up: bool, bounce_time: Duration) -> Result<()>;

    /// Register the callback fired when the button on `pin` is released.
    ///
    /// The callback runs in the input driver's own execution context, not
    /// under the cooperative scheduler.
    fn register_released_callback(&self, pin: u8, callback: ButtonCallback) -> Result<()>;

    /// Remove a previously registered release callback, if any.
    fn remove_released_callback(&self, pin: u8) -> Result<()>;

    /// Whether the button is currently pressed; `None` if the pin is not
    /// claimed as a button.
    fn is_pressed(&self, pin: u8) -> Option<bool>;
}

#[derive(Default)]
struct MockGpioInner {
    outputs: HashMap<u8, bool>,
    buttons: HashMap<u8, bool>,
    callbacks: HashMap<u8, Arc<ButtonCallback>>,
}

/// In-memory GPIO implementing both capabilities.
///
/// Tracks pin levels and role claims, and lets tests fire release events
/// with [`MockGpio::fire_released`].
#[derive(Default)]
pub struct MockGpio {
    inner: Mutex<MockGpioInner>,
}

impl MockGpio {
    /// Create an empty mock with no claimed pins.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockGpioInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current level of an output pin, if claimed.
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.lock().outputs.get(&pin).copied()
    }

    /// Simulate the physical button state.
    pub fn set_pressed(&self, pin: u8, pressed: bool) {
        if let Some(state) = self.lock().buttons.get_mut(&pin) {
            *state = pressed;
        }
    }

    /// Simulate a debounced release edge, invoking the registered callback
    /// synchronously the way a hardware interrupt thread would.
    pub fn fire_released(&self, pin: u8) {
        let callback = self.lock().callbacks.get(&pin).cloned();
        match callback {
            Some(cb) => cb(),
            None => debug!(pin, "release fired on pin without callback"),
        }
    }
}

impl DigitalOutput for MockGpio {
    fn initialize_outputs(&self, pins: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        for &pin in pins {
            if inner.buttons.contains_key(&pin) {
                return Err(Error::Config(format!(
                    "cannot initialize pin {pin} as output: already claimed as button"
                )));
            }
            if inner.outputs.contains_key(&pin) {
                warn!(pin, "output pin already initialized");
                continue;
            }
            inner.outputs.insert(pin, false);
        }
        Ok(())
    }

    fn set(&self, pin: u8, high: bool) -> Result<()> {
        match self.lock().outputs.get_mut(&pin) {
            Some(level) => {
                *level = high;
                Ok(())
            }
            None => Err(Error::Hardware(format!(
                "pin {pin} not initialized as output"
            ))),
        }
    }
}

impl DigitalInput for MockGpio {
    fn initialize_button(&self, pin: u8, _pull_up: bool, _bounce_time: Duration) -> Result<()> {
        let mut inner = self.lock();
        if inner.outputs.contains_key(&pin) {
            return Err(Error::Config(format!(
                "cannot initialize pin {pin} as button: already claimed as output"
            )));
        }
        if inner.buttons.contains_key(&pin) {
            warn!(pin, "button already initialized");
            return Ok(());
        }
        inner.buttons.insert(pin, false);
        Ok(())
    }

    fn register_released_callback(&self, pin: u8, callback: ButtonCallback) -> Result<()> {
        let mut inner = self.lock();
        if !inner.buttons.contains_key(&pin) {
            return Err(Error::Config(format!(
                "pin {pin} not initialized as button"
            )));
        }
        inner.callbacks.insert(pin, Arc::new(callback));
        Ok(())
    }

    fn remove_released_callback(&self, pin: u8) -> Result<()> {
        self.lock().callbacks.remove(&pin);
        Ok(())
    }

    fn is_pressed(&self, pin: u8) -> Option<bool> {
        self.lock().buttons.get(&pin).copied()
    }
}
