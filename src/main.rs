#[macro_use]
extern crate log;

mod args;
mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use outpin::gpio::mem::MemoryProvider;
use outpin::gpio::rpi::RaspberryProvider;
use outpin::{KeyHandler, LineProvider, OutputDriver, Registrar, VirtualKey};

use crate::args::Args;
use crate::config::AppConfig;

fn main() {
    let args: Args = argh::from_env();
    env_logger::Builder::new()
        .filter_level(args.log_level.0)
        .init();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig::load_from_file(&args.config)?;

    let exit = Arc::new(AtomicBool::new(false));
    {
        let exit = exit.clone();
        ctrlc::set_handler(move || exit.store(true, Ordering::SeqCst))?;
    }

    let registrar = Registrar::new();
    if args.dry_run {
        info!("dry run: using in-memory GPIO backend");
        run_loop(MemoryProvider::new(), &config, registrar, exit)
    } else {
        run_loop(RaspberryProvider::new()?, &config, registrar, exit)
    }
}

fn run_loop<P>(
    provider: P,
    config: &AppConfig,
    registrar: Registrar,
    exit: Arc<AtomicBool>,
) -> anyhow::Result<()>
where
    P: LineProvider,
{
    let now = Instant::now();

    let mut repeat_led = OutputDriver::open(
        &provider,
        &config.repeat_led.line,
        config.repeat_led.key,
        registrar.clone(),
    )?;
    repeat_led.set_debounce_delay(config.repeat_led.debounce());
    repeat_led.register()?;
    repeat_led.toggle_repeat(now)?;

    let mut timeout_led = OutputDriver::open(
        &provider,
        &config.timeout_led.line,
        config.timeout_led.key,
        registrar.clone(),
    )?;
    timeout_led.register()?;
    timeout_led.toggle_timeout(now, config.timeout_led.timeout())?;

    let mut controller = BlinkController::new(config);
    let poll_interval = config.poll_interval();

    while !exit.load(Ordering::SeqCst) {
        let now = Instant::now();
        repeat_led.tick(now);
        timeout_led.tick(now);
        registrar.dispatch(&mut controller);

        if controller.take_stop_repeat() {
            info!("press limit reached, stopping repeat");
            repeat_led.cancel_callbacks();
        }
        if controller.take_stop_timeout() {
            info!("cancelling pending auto-off");
            timeout_led.cancel_callbacks();
        }

        thread::sleep(poll_interval);
    }

    for led in [&mut repeat_led, &mut timeout_led] {
        led.cancel_callbacks();
        led.unregister();
        if let Err(e) = led.close() {
            error!("error closing driver on {}: {e}", led.identifier());
        }
    }
    Ok(())
}

/// Press-counting policy lives here, not in the driver: the repeat is
/// cancelled after a configured number of observed presses, and a press on
/// the auto-off LED's key cancels its pending flip-back.
struct BlinkController {
    repeat_key: VirtualKey,
    timeout_key: VirtualKey,
    press_limit: u32,
    presses: u32,
    stop_repeat: bool,
    stop_timeout: bool,
}

impl BlinkController {
    fn new(config: &AppConfig) -> Self {
        BlinkController {
            repeat_key: config.repeat_led.key,
            timeout_key: config.timeout_led.key,
            press_limit: config.repeat_led.press_limit,
            presses: 0,
            stop_repeat: false,
            stop_timeout: false,
        }
    }

    fn take_stop_repeat(&mut self) -> bool {
        std::mem::take(&mut self.stop_repeat)
    }

    fn take_stop_timeout(&mut self) -> bool {
        std::mem::take(&mut self.stop_timeout)
    }
}

impl KeyHandler for BlinkController {
    fn on_key_down(&mut self, key: VirtualKey, repeat_count: u32) {
        if repeat_count != 0 {
            return;
        }
        if key == self.repeat_key {
            self.presses += 1;
            info!("turn on {}", self.presses);
            if self.presses >= self.press_limit {
                self.stop_repeat = true;
            }
        } else if key == self.timeout_key {
            self.stop_timeout = true;
        }
    }

    fn on_key_up(&mut self, key: VirtualKey) {
        if key == self.repeat_key {
            info!("turn off");
        }
    }
}
