mod app;
mod backend;
mod config;
mod preview;
mod reader;
mod speech;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::{AppState, BackendEvent};

fn main() {
    env_logger::init();
    log::info!("Easy Reader starting");

    let application = libadwaita::Application::builder()
        .application_id("io.github.easyreader.EasyReader")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Widgets and background work both report through this channel
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = Rc::new(RefCell::new(AppState::new(backend_tx.clone())));
    log::info!("Backend at {}", state.borrow().config.backend_url);

    let window = ui::window::build_window(app, backend_tx);
    window.window.present();
    state.borrow_mut().window = Some(window);
    app::refresh_all(&state);

    // Attach the event handler
    gtk4::glib::spawn_future_local(async move {
        while let Ok(event) = backend_rx.recv().await {
            app::handle_backend_event(&state, event);
        }
    });
}
