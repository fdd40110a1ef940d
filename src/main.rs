//! Binify Frontend Entry Point

mod app;
mod commands;
mod comments;
mod components;
mod config;
mod models;
mod pagination;
mod task;
mod vote;

#[cfg(test)]
mod testing;

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    // Components spawn before any view is mounted
    let _ = any_spawner::Executor::init_wasm_bindgen();
    app::run();
}
