//! SiderealDrive firmware entry point.
//!
//! Boot sequence:
//! 1. UART logger up, version banner queued
//! 2. PWM carrier and channel configured (output idles at 0)
//! 3. Tick task spawned, pinned to core 0 at high priority
//! 4. Main task runs the rate controller and drains the log ring
//!
//! Pins (ESP32-S3 devkit):
//!
//! | GPIO | function             |
//! |------|----------------------|
//! | 4    | PWM out (motor amp)  |
//! | 5    | slow guide button    |
//! | 6    | fast guide button    |
//! | 7    | rotary switch A      |
//! | 15   | rotary switch B      |
//! | 17   | UART1 TX (log)       |

#[cfg(target_os = "espidf")]
use sidereal_drive::{
    config::CONFIG,
    controller::RateController,
    dds::SINE_NORMAL,
    drive::SharedDrive,
    hal::{pwm, watchdog, GpioSwitch, LedcSink, TaskWatchdog, TimerTick},
    logging::LogRing,
    rt_info,
    scheduler::TickScheduler,
    uart_logger::{UartLogger, UartLoggerConfig},
};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    hal::{
        cpu::Core,
        delay::FreeRtos,
        peripherals::Peripherals,
        task::{thread::ThreadSpawnConfiguration, watchdog::TWDT},
        timer::TIMER00,
    },
    sys::{EspError, ESP_FAIL},
};

#[cfg(target_os = "espidf")]
static DRIVE: SharedDrive = SharedDrive::new(CONFIG, &SINE_NORMAL);

#[cfg(target_os = "espidf")]
static LOG: LogRing = LogRing::new();

#[cfg(target_os = "espidf")]
const TICK_TASK_PRIORITY: u8 = 20;

#[cfg(target_os = "espidf")]
const TICK_TASK_STACK: usize = 4096;

#[cfg(target_os = "espidf")]
fn main() -> Result<(), EspError> {
    esp_idf_svc::sys::link_patches();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let mut logger = UartLogger::new(peripherals.uart1, pins.gpio17, &UartLoggerConfig::default())?;
    rt_info!(LOG, 0, "{}", env!("VERSION_STRING"));

    let carrier = pwm::carrier_timer(peripherals.ledc.timer0)?;
    let sink = LedcSink::new(peripherals.ledc.channel0, &carrier, pins.gpio4)?;

    let switch = GpioSwitch::new(
        pins.gpio5.into(),
        pins.gpio6.into(),
        pins.gpio7.into(),
        pins.gpio15.into(),
    )?;

    let timer = peripherals.timer00;
    let twdt = peripherals.twdt;

    std::thread::scope(|scope| -> Result<(), EspError> {
        ThreadSpawnConfiguration {
            name: Some(b"tick\0"),
            stack_size: TICK_TASK_STACK,
            priority: TICK_TASK_PRIORITY,
            pin_to_core: Some(Core::Core0),
            ..Default::default()
        }
        .set()?;

        let tick_task = std::thread::Builder::new()
            .stack_size(TICK_TASK_STACK)
            .spawn_scoped(scope, move || run_tick_task(timer, twdt, sink))
            .map_err(|_| EspError::from_infallible::<ESP_FAIL>())?;

        ThreadSpawnConfiguration::default().set()?;

        let mut controller = RateController::new(&DRIVE, switch, &LOG, CONFIG);
        rt_info!(LOG, DRIVE.elapsed_ticks(), "control loop running");

        loop {
            controller.poll();
            logger.drain(&LOG, DRIVE.elapsed_ticks());

            if tick_task.is_finished() {
                // Only an init failure ends the tick task.
                return match tick_task.join() {
                    Ok(result) => result,
                    Err(_) => Err(EspError::from_infallible::<ESP_FAIL>()),
                };
            }

            FreeRtos::delay_ms(1);
        }
    })
}

/// Body of the tick task. Drivers that bind to the calling task (timer
/// notification, TWDT subscription) are created here.
#[cfg(target_os = "espidf")]
fn run_tick_task(timer: TIMER00, twdt: TWDT, sink: LedcSink<'_>) -> Result<(), EspError> {
    let mut watchdog_driver = watchdog::driver(twdt)?;
    let watchdog = TaskWatchdog::subscribe(&mut watchdog_driver)?;
    let mut ticks = TimerTick::new(timer)?;

    TickScheduler::new(&DRIVE, sink, watchdog).run(&mut ticks);
    Ok(())
}

/// Host build: print the rate table the firmware would drive.
#[cfg(not(target_os = "espidf"))]
fn main() {
    use sidereal_drive::config::{PHASE_EXTRA_BITS, TICK_HZ};
    use sidereal_drive::rate::{Rate, RATE_TABLE};

    println!("{}", env!("VERSION_STRING"));
    println!("tick {} Hz, {} extra phase bits", TICK_HZ, PHASE_EXTRA_BITS);
    for rate in Rate::ALL {
        if let Some(profile) = RATE_TABLE.profile(rate) {
            println!(
                "{:>9}: increment {:>9}, {:.4} Hz, peak {}",
                rate.as_str(),
                profile.increment,
                profile.frequency(),
                profile.table.peak()
            );
        }
    }
}
