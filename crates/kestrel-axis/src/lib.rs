#![warn(missing_docs)]
#![doc = "Control core for a single brushed-DC motor axis."]
#![doc = ""]
#![doc = "Sequences application commands, a periodic update tick, and encoder"]
#![doc = "telemetry into one motion policy: homing against a binary limit sensor,"]
#![doc = "distance-limited moves, and closed-loop speed tracking with a quantized"]
#![doc = "PID controller, actuated through an H-bridge hardware port."]
//!
//! # Dispatch and concurrency contract
//!
//! All event dispatch is run-to-completion and never blocks: a transition,
//! its exit/entry actions, and the associated hardware-port calls execute
//! synchronously inside whichever call delivered the event. The core does
//! **not** serialize calls arriving from different execution contexts:
//! when commands, the tick, and telemetry come from separate threads (or
//! telemetry from interrupt context), the owner must wrap the axis in a
//! mutex or funnel everything through one queue. The only structure safe
//! to touch concurrently without that serialization is the [`HomeLatch`],
//! which exists precisely to carry the home-sensor interrupt's reading
//! into the next periodic update.

pub mod axis;
pub mod command;
pub mod config;
pub mod error;
pub mod latch;
pub mod motion;
pub mod pid;
pub mod port;

pub use axis::{AxisState, AxisStatus, MotorAxis};
pub use command::{Direction, DriveTarget, MotionRequest, StopKind};
pub use config::AxisConfig;
pub use error::AxisError;
pub use latch::HomeLatch;
pub use pid::Pid;
pub use port::{BridgeChannel, FaultKind, HardwarePort};
