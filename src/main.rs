use std::rc::Rc;

use valium::{
    app::{Valium, Window},
    config::AppConfig,
    driver::AshDriver,
    error::RenderResult,
};

fn run() -> RenderResult<()> {
    let config = AppConfig::default();
    let driver = Rc::new(AshDriver::new()?);
    let window = Window::new(&config)?;

    let mut valium = Valium::new(driver, Box::new(window), &config)?;
    valium.run();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("error: {err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
