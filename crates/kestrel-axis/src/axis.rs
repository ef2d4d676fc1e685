//! The motor axis state machine.
//!
//! [`MotorAxis`] digests asynchronous inputs (application commands, the
//! periodic update tick, and encoder telemetry) into one motion policy
//! over five states: `SeekingHome`, `Home`, `Running`,
//! `Stopping`, and `Faulted`. Dispatch is a `match` over the
//! state/event pair with explicit entry actions; a transition replaces
//! the active variant and runs to completion before the call returns.
//!
//! Events outside a state's accepted set are silently ignored. That is
//! the intended permissive policy, not an error path: a stop request
//! while already at home, telemetry while faulted, and similar combinations
//! simply change nothing.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::command::{Direction, DriveTarget, MotionRequest, StopKind};
use crate::config::AxisConfig;
use crate::error::AxisError;
use crate::latch::HomeLatch;
use crate::motion;
use crate::pid::Pid;
use crate::port::{BridgeChannel, FaultKind, HardwarePort};

/// Lifecycle state of the axis.
///
/// Exactly one state is active; the machine is created in
/// [`SeekingHome`](Self::SeekingHome) and lives for the axis lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisState {
    /// Searching for the home sensor at the fixed homing duty.
    SeekingHome,
    /// At the absolute reference; position zeroed, motion cleared.
    Home,
    /// Actively driven per the committed motion request.
    Running,
    /// Coming to rest; may auto-resume once the reversal dwell expires.
    Stopping,
    /// Unrecoverable fault; only re-initialization leaves this state.
    Faulted,
}

/// Events digested by the state machine.
#[derive(Debug, Clone, Copy)]
enum Event {
    Tick,
    Start,
    Stop(StopKind),
    Home(bool),
    Telemetry { position: i32, speed: i32 },
    GoHome,
}

/// Motion parameters committed by the last accepted request, plus the
/// bookkeeping dispatch keeps across events.
#[derive(Debug, Clone, Copy)]
struct RuntimeState {
    direction: Direction,
    duty: u8,
    distance: i32,
    target: DriveTarget,
    baseline: i32,
    stop_kind: StopKind,
    auto_restart: bool,
}

impl RuntimeState {
    fn cleared() -> Self {
        Self {
            direction: Direction::Forward,
            duty: 0,
            distance: 0,
            target: DriveTarget::Duty(0),
            baseline: 0,
            stop_kind: StopKind::Normal,
            auto_restart: false,
        }
    }
}

/// Snapshot of the axis for the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisStatus {
    /// Active state.
    pub state: AxisState,
    /// Committed travel direction.
    pub direction: Direction,
    /// Committed duty, percent.
    pub duty: u8,
    /// Last encoder position seen, ticks.
    pub position: i32,
    /// Whether the speed loop is engaged.
    pub speed_controlled: bool,
}

/// Control core for one brushed-DC motor axis.
///
/// Owns its configuration, PID state, and runtime state; borrows nothing
/// globally, so independent instances coexist and tests construct one
/// per case. See the crate docs for the dispatch serialization the owner
/// must provide.
pub struct MotorAxis<P: HardwarePort> {
    port: P,
    cfg: AxisConfig,
    pid: Pid,
    latch: Arc<HomeLatch>,
    state: AxisState,
    run: RuntimeState,
    pending: Option<MotionRequest>,
    ticks_in_state: u32,
    last_position: i32,
}

impl<P: HardwarePort> MotorAxis<P> {
    /// Build an axis over `port` and begin the homing search.
    ///
    /// The configuration is validated here. The port must already be
    /// initialized; hardware bring-up failures belong to the
    /// surrounding driver and abort before an axis exists.
    pub fn new(port: P, cfg: AxisConfig) -> Result<Self, AxisError> {
        cfg.validate()?;
        let pid = Pid::new(cfg.kp, cfg.ki, cfg.kd);
        let mut axis = Self {
            port,
            pid,
            latch: Arc::new(HomeLatch::new()),
            state: AxisState::SeekingHome,
            run: RuntimeState::cleared(),
            pending: None,
            ticks_in_state: 0,
            last_position: 0,
            cfg,
        };
        axis.enter_seeking_home(false);
        Ok(axis)
    }

    /// Request a new motion.
    ///
    /// `distance_ticks` ≤ 0 means "run until the home sensor trips".
    /// Rejected while homing or faulted, and at home without a positive
    /// distance target.
    pub fn start(
        &mut self,
        direction: Direction,
        distance_ticks: i32,
        target: DriveTarget,
    ) -> Result<(), AxisError> {
        match self.state {
            AxisState::Faulted => Err(AxisError::Rejected("axis is faulted")),
            AxisState::SeekingHome => Err(AxisError::Rejected("homing search in progress")),
            AxisState::Home if distance_ticks <= 0 => {
                Err(AxisError::Rejected("already at the home reference"))
            }
            _ => {
                self.pending = Some(MotionRequest {
                    direction,
                    distance: distance_ticks,
                    target,
                });
                self.dispatch(Event::Start);
                Ok(())
            }
        }
    }

    /// Like [`start`](Self::start), with the distance given in degrees
    /// of output rotation.
    pub fn start_degrees(
        &mut self,
        direction: Direction,
        degrees: i32,
        target: DriveTarget,
    ) -> Result<(), AxisError> {
        let ticks = self.cfg.ticks_from_degrees(degrees);
        self.start(direction, ticks, target)
    }

    /// Request a stop. Always accepted; takes effect within this call.
    pub fn stop(&mut self, kind: StopKind) -> Result<(), AxisError> {
        self.dispatch(Event::Stop(kind));
        Ok(())
    }

    /// Force a return to the homing search. No-op when already at home.
    pub fn go_home(&mut self) -> Result<(), AxisError> {
        match self.state {
            AxisState::Home => Ok(()),
            AxisState::Faulted => Err(AxisError::Rejected("axis is faulted")),
            _ => {
                self.dispatch(Event::GoHome);
                Ok(())
            }
        }
    }

    /// Change duty while running open-loop: the sign selects the
    /// direction, the magnitude the duty. Rejected while the speed loop
    /// is engaged.
    pub fn change_drive_level(&mut self, level: i8) -> Result<(), AxisError> {
        if self.state != AxisState::Running {
            return Err(AxisError::Rejected("axis is not running"));
        }
        if self.run.target.is_speed_controlled() {
            warn!(level, "drive level change rejected while speed-controlled");
            return Err(AxisError::Rejected("motion is speed-controlled"));
        }
        let direction = match level {
            0 => self.run.direction,
            l if l < 0 => Direction::Reverse,
            _ => Direction::Forward,
        };
        let duty = level.unsigned_abs().min(100);
        self.pending = Some(MotionRequest {
            direction,
            distance: self.run.distance,
            target: DriveTarget::Duty(duty),
        });
        self.dispatch(Event::Start);
        Ok(())
    }

    /// Replace the speed-loop gains (quantized; see [`Pid`]).
    pub fn set_pid_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.pid.set_gains(kp, ki, kd);
    }

    /// Current speed-loop gains, as quantized.
    pub fn pid_gains(&self) -> (f32, f32, f32) {
        self.pid.gains()
    }

    /// Encoder telemetry ingress.
    ///
    /// `position` is ticks in the encoder frame; `speed_rpm` is signed in
    /// the same frame (positive while moving [`Direction::Forward`]).
    pub fn update_position_and_speed(&mut self, position: i32, speed_rpm: i32) {
        self.dispatch(Event::Telemetry {
            position,
            speed: speed_rpm,
        });
    }

    /// Periodic update: drain at most one latched home reading, then
    /// advance time-based logic. Call at a steady control period.
    pub fn update(&mut self) {
        if let Some(reading) = self.latch.take() {
            self.dispatch(Event::Home(reading));
        }
        self.dispatch(Event::Tick);
    }

    /// Handle shared with the home-sensor interrupt; post edge readings
    /// with [`HomeLatch::post`].
    pub fn home_latch(&self) -> Arc<HomeLatch> {
        Arc::clone(&self.latch)
    }

    /// Active state.
    pub fn state(&self) -> AxisState {
        self.state
    }

    /// Snapshot for the application layer.
    pub fn status(&self) -> AxisStatus {
        AxisStatus {
            state: self.state,
            direction: self.run.direction,
            duty: self.run.duty,
            position: self.last_position,
            speed_controlled: self.run.target.is_speed_controlled(),
        }
    }

    /// The underlying hardware port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the underlying hardware port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    // ----- dispatch -----

    fn dispatch(&mut self, event: Event) {
        if matches!(event, Event::Tick) {
            self.ticks_in_state = self.ticks_in_state.saturating_add(1);
        }
        if let Event::Telemetry { position, .. } = event {
            self.last_position = position;
        }

        match (self.state, event) {
            // ----- SeekingHome -----
            (AxisState::SeekingHome, Event::Home(true)) => {
                self.enter_home();
            }
            (AxisState::SeekingHome, Event::Home(false)) => {
                // The sensor dropped before the search reached it:
                // re-evaluate the approach direction. The timeout budget
                // keeps running across the re-entry.
                self.enter_seeking_home(true);
            }
            (AxisState::SeekingHome, Event::Tick) => {
                if self.ticks_in_state >= self.cfg.homing_timeout_ticks {
                    error!(
                        ticks = self.ticks_in_state,
                        "home sensor not found within the search budget"
                    );
                    self.enter_faulted(FaultKind::HomeNotFound);
                }
            }

            // ----- Home -----
            (AxisState::Home, Event::Start) => {
                if self.pending.is_some_and(|r| r.distance > 0) {
                    self.enter_running();
                }
            }

            // ----- Running -----
            (AxisState::Running, Event::Start) => self.running_on_start(),
            (AxisState::Running, Event::Stop(kind)) => self.enter_stopping(kind, false),
            (AxisState::Running, Event::Home(true)) if self.run.distance <= 0 => {
                // An until-home move reached the reference.
                self.enter_home();
                self.port.on_move_complete();
            }
            (AxisState::Running, Event::Telemetry { position, speed }) => {
                self.running_on_telemetry(position, speed);
            }
            (AxisState::Running, Event::GoHome) => self.enter_seeking_home(false),

            // ----- Stopping -----
            (AxisState::Stopping, Event::Start) => self.stopping_on_start(),
            (AxisState::Stopping, Event::Stop(kind)) => {
                // A repeated stop of the recorded kind only needs to
                // cancel a queued restart; a changed kind re-commands
                // the bridge.
                if kind != self.run.stop_kind {
                    self.enter_stopping(kind, false);
                } else {
                    self.run.auto_restart = false;
                }
            }
            (AxisState::Stopping, Event::Tick) => {
                if self.run.auto_restart && self.ticks_in_state >= self.cfg.dwell_ticks {
                    self.enter_running();
                }
            }
            (AxisState::Stopping, Event::GoHome) => self.enter_seeking_home(false),

            // Everything else is deliberately ignored.
            _ => {}
        }
    }

    fn running_on_start(&mut self) {
        let Some(req) = self.pending else { return };
        if req.direction != self.run.direction {
            // Reversal: full stop first, resume after the dwell. The
            // pending request survives the stop and is committed on
            // re-entry into Running.
            self.enter_stopping(StopKind::Normal, true);
        } else if req.target != self.run.target || req.distance != self.run.distance {
            self.enter_running();
        } else {
            // Identical to the committed motion; nothing to recommit.
            self.pending = None;
        }
    }

    fn stopping_on_start(&mut self) {
        let Some(req) = self.pending else { return };
        if req.direction != self.run.direction && self.ticks_in_state < self.cfg.dwell_ticks {
            // Too early to reverse; hold the request and resume once the
            // dwell expires.
            self.run.auto_restart = true;
        } else {
            self.enter_running();
        }
    }

    fn running_on_telemetry(&mut self, position: i32, speed: i32) {
        if let DriveTarget::Speed(target) = self.run.target {
            // Telemetry speed is signed in the encoder frame; fold it
            // into the commanded direction before comparing.
            let measured = match self.run.direction {
                Direction::Forward => speed,
                Direction::Reverse => -speed,
            };
            let err = motion::scale_speed_error(target, measured);
            let correction = motion::correction_to_duty(self.pid.update(err));
            let base = motion::duty_from_speed(target) as i32;
            let duty = (base + correction).clamp(0, 100) as u8;
            if duty != self.run.duty {
                self.run.duty = duty;
                self.apply_duty();
            }
        }

        if self.run.distance > 0 {
            let traveled = (position as i64 - self.run.baseline as i64).unsigned_abs();
            if traveled > self.run.distance as u64 {
                debug!(traveled, target = self.run.distance, "distance target reached");
                self.enter_stopping(StopKind::Brake, false);
                self.port.on_move_complete();
            }
        }
    }

    // ----- entry actions -----

    fn enter_seeking_home(&mut self, preserve_clock: bool) {
        self.set_state(AxisState::SeekingHome, preserve_clock);
        self.pending = None;
        let at_sensor = self.port.read_home_sensor();
        // Approach the sensor from its far side: back away when already
        // on it, drive toward it otherwise.
        let direction = if at_sensor {
            self.cfg.home_direction.opposite()
        } else {
            self.cfg.home_direction
        };
        self.run.direction = direction;
        self.run.duty = self.cfg.homing_duty;
        self.run.target = DriveTarget::Duty(self.cfg.homing_duty);
        self.run.distance = 0;
        self.run.auto_restart = false;
        self.apply_drive();
    }

    fn enter_home(&mut self) {
        self.set_state(AxisState::Home, false);
        self.port.reset_position();
        self.last_position = 0;
        self.pending = None;
        self.run = RuntimeState::cleared();
        self.run.stop_kind = StopKind::Brake;
        self.apply_stop(StopKind::Brake);
    }

    fn enter_running(&mut self) {
        self.set_state(AxisState::Running, false);
        if let Some(req) = self.pending.take() {
            self.run.direction = req.direction;
            self.run.distance = req.distance;
            self.run.target = req.target;
            self.run.duty = match req.target {
                DriveTarget::Duty(duty) => duty.min(100),
                DriveTarget::Speed(rpm) => motion::duty_from_speed(rpm),
            };
        }
        self.run.baseline = self.port.position();
        self.run.auto_restart = false;
        self.pid.reset();
        self.apply_drive();
    }

    fn enter_stopping(&mut self, kind: StopKind, auto_restart: bool) {
        self.set_state(AxisState::Stopping, false);
        self.run.stop_kind = kind;
        self.run.auto_restart = auto_restart;
        self.apply_stop(kind);
    }

    fn enter_faulted(&mut self, fault: FaultKind) {
        self.port.on_error(fault);
        self.set_state(AxisState::Faulted, false);
        self.pending = None;
        self.run = RuntimeState::cleared();
        self.apply_stop(StopKind::Normal);
    }

    fn set_state(&mut self, next: AxisState, preserve_clock: bool) {
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "state transition");
        }
        self.state = next;
        if !preserve_clock {
            self.ticks_in_state = 0;
        }
    }

    // ----- hardware application -----

    fn hot_cold(&self) -> (BridgeChannel, BridgeChannel) {
        match self.run.direction {
            Direction::Forward => (BridgeChannel::A, BridgeChannel::B),
            Direction::Reverse => (BridgeChannel::B, BridgeChannel::A),
        }
    }

    fn apply_drive(&mut self) {
        let (hot, cold) = self.hot_cold();
        self.port.set_direction_pins(self.run.direction);
        self.port.set_duty(cold, 0);
        self.port.set_duty(hot, self.run.duty);
    }

    /// Re-apply only the duty, for speed-loop corrections mid-run.
    fn apply_duty(&mut self) {
        let (hot, _) = self.hot_cold();
        self.port.set_duty(hot, self.run.duty);
    }

    fn apply_stop(&mut self, kind: StopKind) {
        match kind {
            StopKind::Normal => {
                self.port.set_duty(BridgeChannel::A, 0);
                self.port.set_duty(BridgeChannel::B, 0);
            }
            StopKind::Brake => {
                self.port.set_duty(BridgeChannel::A, 100);
                self.port.set_duty(BridgeChannel::B, 100);
            }
        }
    }
}
