use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use newengine_platform_winit::WinitNative;
use newengine_window::native::Waker;
use newengine_window::{BridgeConfig, Environment, Event, Key, Window};

const CONFIG_PATH: &str = "window.toml";

/// Set from the Ctrl-C handler, checked once per frame.
#[derive(Clone)]
struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Ctrl-C also wakes a blocked pump so the flag is seen promptly.
    fn install_ctrlc(&self, waker: Option<Arc<dyn Waker>>) -> anyhow::Result<()> {
        let flag = self.flag.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
            if let Some(w) = waker.as_ref() {
                w.wake();
            }
        })?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::load_or_default(CONFIG_PATH)?;
    newengine_modules_logging::init(&config.log_filter);

    let env = Environment::with_config(WinitNative::new()?, config);
    let mut window = Window::new(&env)?;
    info!("window {:?} open, pump {:?}", window.handle(), window.pump());

    let shutdown = ShutdownFlag::new();
    shutdown.install_ctrlc(env.waker())?;

    while window.advance() {
        if shutdown.is_set() {
            warn!("interrupted");
            window.set_should_close(true)?;
            continue;
        }

        while let Some(event) = window.poll() {
            match event {
                Event::KeyPressed(k) if k.key == Key::Escape => {
                    info!("escape pressed, closing");
                    window.set_should_close(true)?;
                }
                Event::Character(_) => {
                    if let Some(c) = event.as_char() {
                        info!("typed {:?}", c);
                    }
                }
                Event::CursorMoved(_) => {}
                other => info!("{:?}", other),
            }
        }
    }

    info!("window closed");
    Ok(())
}
