//! Simulated motor rig.
//!
//! First-order motor physics behind the same seams the real driver has:
//! simulated pins and PWM channels feed a `kestrel-hal` H-bridge, and
//! [`RigPort`] implements the core's hardware port on top of it. The
//! physics thread, the bridge writes, and the encoder readback all share
//! one state cell, so the rig behaves like a closed electromechanical
//! loop.

use std::sync::Arc;

use anyhow::Context;
use kestrel_axis::{BridgeChannel, Direction, FaultKind, HardwarePort};
use kestrel_hal::{DigitalOutput, GpioError, HBridge, Half, PwmError, PwmOutput};
use parking_lot::Mutex;
use tracing::{error, info};

const TICKS_PER_REV: f64 = 2400.0;
/// Steady-state ticks/second produced per percent of drive duty.
const TICKS_PER_SEC_PER_PERCENT: f64 = 70.0;
/// Mechanical time constant while driving, seconds.
const TAU_DRIVE: f64 = 0.05;
/// Mechanical time constant while braking, seconds.
const TAU_BRAKE: f64 = 0.01;

#[derive(Debug)]
struct SimState {
    position: f64,
    velocity: f64,
    duty: [f64; 2],
    dir_pins: [bool; 2],
}

/// Handle on the simulated motor; clones share the same state.
#[derive(Clone)]
pub struct SimRig {
    state: Arc<Mutex<SimState>>,
}

impl SimRig {
    /// A rig resting `start_ticks` out from the home sensor.
    pub fn new(start_ticks: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                position: start_ticks,
                velocity: 0.0,
                duty: [0.0, 0.0],
                dir_pins: [false, false],
            })),
        }
    }

    /// Advance the physics by `dt` seconds.
    pub fn step(&self, dt: f64) {
        let mut s = self.state.lock();
        let braking = s.duty[0] > 0.0 && s.duty[1] > 0.0;
        let target = if braking {
            0.0
        } else {
            (s.duty[0] - s.duty[1]) * TICKS_PER_SEC_PER_PERCENT
        };
        let tau = if braking { TAU_BRAKE } else { TAU_DRIVE };
        let alpha = (dt / tau).min(1.0);
        let velocity = s.velocity + (target - s.velocity) * alpha;
        s.velocity = velocity;
        s.position += velocity * dt;
    }

    /// Encoder snapshot: position in ticks and signed speed in RPM.
    pub fn telemetry(&self) -> (i32, i32) {
        let s = self.state.lock();
        (s.position as i32, (s.velocity * 60.0 / TICKS_PER_REV) as i32)
    }

    /// Home sensor level; active at and below the reference.
    pub fn sensor_level(&self) -> bool {
        self.state.lock().position <= 0.0
    }

    /// Levels of the two direction pins, for observability.
    pub fn direction_pins(&self) -> [bool; 2] {
        self.state.lock().dir_pins
    }

    /// Build the hardware port: simulated pins into an H-bridge, wrapped
    /// in the port the axis core drives. Bridge bring-up failures abort
    /// here, before any axis exists.
    pub fn port(&self) -> anyhow::Result<RigPort> {
        let bridge = HBridge::new(
            SimPwm { state: self.state.clone(), half: 0 },
            SimPwm { state: self.state.clone(), half: 1 },
            SimPin { state: self.state.clone(), index: 0 },
            SimPin { state: self.state.clone(), index: 1 },
        )
        .context("H-bridge bring-up failed")?;
        Ok(RigPort {
            state: self.state.clone(),
            bridge,
        })
    }
}

/// One simulated PWM channel feeding a bridge half.
pub struct SimPwm {
    state: Arc<Mutex<SimState>>,
    half: usize,
}

impl PwmOutput for SimPwm {
    type Error = PwmError;

    fn enable(&mut self) -> Result<(), PwmError> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), PwmError> {
        self.state.lock().duty[self.half] = 0.0;
        Ok(())
    }

    fn max_duty_cycle(&mut self) -> Result<u16, PwmError> {
        Ok(1000)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), PwmError> {
        self.state.lock().duty[self.half] = duty as f64 / 10.0;
        Ok(())
    }
}

/// One simulated direction pin.
pub struct SimPin {
    state: Arc<Mutex<SimState>>,
    index: usize,
}

impl DigitalOutput for SimPin {
    type Error = GpioError;

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.state.lock().dir_pins[self.index] = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), GpioError> {
        self.state.lock().dir_pins[self.index] = false;
        Ok(())
    }
}

/// The axis core's hardware port over the simulated rig.
pub struct RigPort {
    state: Arc<Mutex<SimState>>,
    bridge: HBridge<SimPwm, SimPwm, SimPin>,
}

impl HardwarePort for RigPort {
    fn position(&mut self) -> i32 {
        self.state.lock().position as i32
    }

    fn reset_position(&mut self) {
        self.state.lock().position = 0.0;
    }

    fn read_home_sensor(&mut self) -> bool {
        self.state.lock().position <= 0.0
    }

    fn set_duty(&mut self, channel: BridgeChannel, percent: u8) {
        let half = match channel {
            BridgeChannel::A => Half::A,
            BridgeChannel::B => Half::B,
        };
        if let Err(err) = self.bridge.set_half_duty(half, percent) {
            error!(%err, "bridge duty write failed");
        }
    }

    fn set_direction_pins(&mut self, direction: Direction) {
        if let Err(err) = self.bridge.set_direction(direction == Direction::Forward) {
            error!(%err, "bridge direction write failed");
        }
    }

    fn on_move_complete(&mut self) {
        info!("move complete");
    }

    fn on_error(&mut self, fault: FaultKind) {
        error!(?fault, "axis fault");
    }
}
