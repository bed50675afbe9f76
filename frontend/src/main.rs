mod components;
mod config;
mod error;
mod mount;
mod services;
mod state;

use std::rc::Rc;

use crate::config::WidgetConfig;

fn main() {
    // Initialize tracing
    tracing_wasm::set_as_global_default();

    let config = Rc::new(WidgetConfig::load());
    mount::start(config);
}
