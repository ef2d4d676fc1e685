use kestrel_axis::*;

/// Minimal in-memory port: tracks the commanded duty and counts
/// notifications, with the encoder position scripted by the example.
#[derive(Debug, Default)]
struct ConsolePort {
    position: i32,
    sensor: bool,
    duty: [u8; 2],
}

impl HardwarePort for ConsolePort {
    fn position(&mut self) -> i32 {
        self.position
    }

    fn reset_position(&mut self) {
        self.position = 0;
    }

    fn read_home_sensor(&mut self) -> bool {
        self.sensor
    }

    fn set_duty(&mut self, channel: BridgeChannel, percent: u8) {
        match channel {
            BridgeChannel::A => self.duty[0] = percent,
            BridgeChannel::B => self.duty[1] = percent,
        }
    }

    fn set_direction_pins(&mut self, direction: Direction) {
        println!("  [port] direction pins -> {:?}", direction);
    }

    fn on_move_complete(&mut self) {
        println!("  [port] move complete");
    }

    fn on_error(&mut self, fault: FaultKind) {
        eprintln!("  [port] fault: {:?}", fault);
    }
}

fn main() {
    let cfg = AxisConfig::default();
    let mut axis = match MotorAxis::new(ConsolePort::default(), cfg) {
        Ok(axis) => axis,
        Err(e) => {
            eprintln!("Failed to initialize the axis: {:?}", e);
            return;
        }
    };

    println!("Initial state: {:?}", axis.state());
    println!("Homing duty on the bridge: {:?}", axis.port().duty);

    // The limit sensor trips; the interrupt side latches the edge and the
    // next periodic update drains it.
    axis.home_latch().post(true);
    axis.update();
    println!("After the home edge: {:?}", axis.state());

    // A 240-tick move at 50% duty.
    if let Err(e) = axis.start(Direction::Forward, 240, DriveTarget::Duty(50)) {
        eprintln!("Start rejected: {:?}", e);
        return;
    }
    println!("Running: {:?}", axis.status());

    // Scripted encoder telemetry walks the axis past its target.
    for position in [80, 160, 241] {
        axis.port_mut().position = position;
        axis.update_position_and_speed(position, 90);
        println!("Step to {:>3} ticks: state {:?}", position, axis.state());
    }

    println!("Final status: {:?}", axis.status());
}
