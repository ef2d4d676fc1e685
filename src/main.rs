mod rig; // brings `rig.rs` in as `crate::rig`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use config::{Config, File, FileFormat};
use kestrel_axis::{AxisConfig, AxisState, Direction, DriveTarget, MotorAxis, StopKind};
use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::rig::{RigPort, SimRig};

const CONFIG_PATH: &str = "config/default.toml";
const CONTROL_PERIOD: Duration = Duration::from_millis(10);
/// Where the simulated motor rests at power-on, ticks out from the sensor.
const START_OFFSET_TICKS: f64 = 500.0;

type SharedAxis = Arc<Mutex<MotorAxis<RigPort>>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cfg = load_config().context("loading axis configuration")?;
    info!(?cfg, "axis configuration loaded");

    let rig = SimRig::new(START_OFFSET_TICKS);
    let port = rig.port().context("bringing up the simulated bridge")?;
    let axis: SharedAxis = Arc::new(Mutex::new(
        MotorAxis::new(port, cfg).context("initializing the axis")?,
    ));
    let latch = axis.lock().home_latch();

    // Telemetry thread, standing in for the encoder ISR of the real
    // system: it steps the physics, posts sensor edges into the latch,
    // and feeds position/speed into the axis. The mutex around the axis
    // is the dispatch serialization the core requires of its owner.
    {
        let rig = rig.clone();
        let axis = Arc::clone(&axis);
        std::thread::Builder::new()
            .name("telemetry".into())
            .spawn(move || {
                let sleeper = spin_sleep::SpinSleeper::new(100_000);
                let mut last_level = rig.sensor_level();
                loop {
                    rig.step(0.001);
                    let level = rig.sensor_level();
                    if level != last_level {
                        latch.post(level);
                        last_level = level;
                    }
                    let (position, speed) = rig.telemetry();
                    axis.lock().update_position_and_speed(position, speed);
                    sleeper.sleep(Duration::from_millis(1));
                }
            })
            .context("spawning telemetry thread")?;
    }

    // Periodic control tick.
    {
        let axis = Arc::clone(&axis);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(CONTROL_PERIOD);
            loop {
                tick.tick().await;
                axis.lock().update();
            }
        });
    }

    run_demo(&axis, &rig).await
}

fn load_config() -> anyhow::Result<AxisConfig> {
    let settings = Config::builder()
        .add_source(File::new(CONFIG_PATH, FileFormat::Toml).required(true))
        .build()
        .with_context(|| format!("reading {CONFIG_PATH}"))?;
    Ok(settings.get::<AxisConfig>("axis")?)
}

/// Scripted command sequence: home, run a distance-limited move, reverse
/// under speed control, and return to the reference.
async fn run_demo(axis: &SharedAxis, rig: &SimRig) -> anyhow::Result<()> {
    info!("waiting for the homing search");
    wait_for(axis, AxisState::Home).await?;
    info!("homed; starting a distance-limited move");

    axis.lock().start(Direction::Forward, 2400, DriveTarget::Duty(45))?;
    wait_for(axis, AxisState::Stopping).await?;
    info!(status = ?axis.lock().status(), "move finished");

    info!("reversing under speed control (90 rpm)");
    axis.lock().start(Direction::Reverse, 4800, DriveTarget::Speed(90))?;
    wait_for(axis, AxisState::Running).await?;

    tokio::time::sleep(Duration::from_millis(800)).await;
    info!(status = ?axis.lock().status(), "cruising");

    axis.lock().stop(StopKind::Normal)?;
    info!("returning to the reference");
    axis.lock().go_home()?;
    wait_for(axis, AxisState::Home).await?;

    let (position, rpm) = rig.telemetry();
    info!(position, rpm, pins = ?rig.direction_pins(), "demo complete");
    Ok(())
}

async fn wait_for(axis: &SharedAxis, want: AxisState) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    loop {
        let state = axis.lock().state();
        if state == want {
            return Ok(());
        }
        if state == AxisState::Faulted {
            anyhow::bail!("axis faulted while waiting for {:?}", want);
        }
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("timed out waiting for {:?}", want);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
