//! Endstop controller.
//!
//! Bridges a debounced hardware callback into the cooperative scheduler.
//! The callback side only ever does a non-blocking enqueue into a bounded
//! channel; losing a redundant trip signal on overflow is safer than
//! blocking the interrupt source. A consumer loop performs the
//! stop-and-retreat sequence and never terminates on error, because the
//! endstop protects the motor for the controller's entire lifetime.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::EndstopConfig;
use crate::error::Result;
use crate::gpio::{DigitalInput, DigitalOutput};
use crate::motor::MotorController;

/// Capacity of the trip event queue.
const QUEUE_CAPACITY: usize = 10;

/// Degrees moved away from the switch after a trip.
const RETREAT_DEGREES: f64 = -2.0;

/// Delay letting motor state settle between sequence stages.
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Backoff after an unexpected error in the consumer loop.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Serializable status snapshot of one endstop.
#[derive(Debug, Clone, Serialize)]
pub struct EndstopStatus {
    /// Name of the motor this endstop protects.
    pub assigned_motor: String,
    /// Reference angle applied on trip.
    pub position: f64,
    /// GPIO pin of the switch.
    pub pin: u8,
    /// Current switch state; `None` if unreadable.
    pub is_pressed: Option<bool>,
}

/// Controls an endstop switch bound to one motor controller.
pub struct EndstopController<O: DigitalOutput, I: DigitalInput> {
    name: String,
    motor: Arc<MotorController<O>>,
    input: Arc<I>,
    settings: Mutex<EndstopConfig>,
    trip_tx: mpsc::Sender<()>,
    trip_rx: Mutex<Option<mpsc::Receiver<()>>>,
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<O, I> EndstopController<O, I>
where
    O: DigitalOutput + 'static,
    I: DigitalInput + 'static,
{
    /// Initialize the switch pin and register the release callback.
    ///
    /// The returned controller is not yet protecting anything; call
    /// [`EndstopController::start_listener`] from the async context to
    /// start the consumer loop.
    pub fn new(
        name: impl Into<String>,
        settings: EndstopConfig,
        motor: Arc<MotorController<O>>,
        input: Arc<I>,
    ) -> Result<Arc<Self>> {
        let name = name.into();
        let (trip_tx, trip_rx) = mpsc::channel(QUEUE_CAPACITY);

        input.initialize_button(
            settings.pin,
            settings.pull_up,
            Duration::from_secs_f64(settings.bounce_time),
        )?;
        register_trip_callback(&*input, settings.pin, &name, trip_tx.clone())?;

        info!(
            endstop = %name,
            motor = %settings.motor_name,
            pin = settings.pin,
            "endstop initialized"
        );
        Ok(Arc::new(Self {
            name,
            motor,
            input,
            settings: Mutex::new(settings),
            trip_tx,
            trip_rx: Mutex::new(Some(trip_rx)),
        }))
    }

    /// The endstop's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status snapshot for external callers.
    pub fn get_status(&self) -> EndstopStatus {
        let settings = lock_ignoring_poison(&self.settings);
        EndstopStatus {
            assigned_motor: settings.motor_name.clone(),
            position: settings.angular_position,
            pin: settings.pin,
            is_pressed: self.input.is_pressed(settings.pin),
        }
    }

    /// Re-bind the endstop: deregister the old pin callback, apply the
    /// new settings and register on the new pin.
    pub fn apply_settings(&self, new_settings: EndstopConfig) -> Result<()> {
        let mut settings = lock_ignoring_poison(&self.settings);

        self.input.remove_released_callback(settings.pin)?;
        self.input.initialize_button(
            new_settings.pin,
            new_settings.pull_up,
            Duration::from_secs_f64(new_settings.bounce_time),
        )?;
        register_trip_callback(&*self.input, new_settings.pin, &self.name, self.trip_tx.clone())?;

        info!(
            endstop = %self.name,
            motor = %new_settings.motor_name,
            pin = new_settings.pin,
            "endstop re-initialized"
        );
        *settings = new_settings;
        Ok(())
    }

    /// Start the consumer loop under the cooperative scheduler.
    ///
    /// Returns `None` if the listener was already started.
    pub fn start_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let rx = lock_ignoring_poison(&self.trip_rx).take()?;
        let this = self.clone();
        debug!(endstop = %this.name, "starting trip event listener");
        Some(tokio::spawn(this.process_events(rx)))
    }

    async fn process_events(self: Arc<Self>, mut rx: mpsc::Receiver<()>) {
        while rx.recv().await.is_some() {
            if let Err(e) = self.handle_trip().await {
                error!(endstop = %self.name, error = %e, "trip handling failed");
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }
    }

    /// The ordered trip sequence: stop, settle, snap the angle to the
    /// configured reference, settle, retreat 2 degrees off the switch.
    async fn handle_trip(&self) -> Result<()> {
        let (motor_name, position) = {
            let settings = lock_ignoring_poison(&self.settings);
            (settings.motor_name.clone(), settings.angular_position)
        };
        info!(
            endstop = %self.name,
            motor = %motor_name,
            "endstop triggered, stopping motor and moving back"
        );

        self.motor.stop();
        tokio::time::sleep(SETTLE_DELAY).await;

        self.motor.override_angle(position);
        debug!(endstop = %self.name, position, "motor angle snapped to endstop position");
        tokio::time::sleep(SETTLE_DELAY).await;

        self.motor.move_degrees(RETREAT_DEGREES).await?;
        debug!(endstop = %self.name, "retreat move complete");
        Ok(())
    }
}

/// Register the interrupt-side callback: a single non-blocking
/// enqueue-or-drop, nothing else.
fn register_trip_callback<I: DigitalInput + ?Sized>(
    input: &I,
    pin: u8,
    name: &str,
    tx: mpsc::Sender<()>,
) -> Result<()> {
    let endstop_name = name.to_owned();
    input.register_released_callback(
        pin,
        Box::new(move || match tx.try_send(()) {
            Ok(()) => debug!(endstop = %endstop_name, pin, "trip event queued"),
            Err(mpsc::error::TrySendError::Full(())) => {
                warn!(endstop = %endstop_name, "trip event queue full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                warn!(endstop = %endstop_name, "trip event queue closed, event dropped");
            }
        }),
    )
}
