use std::num::NonZeroU32;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use nth_host::compositor::CompositeError;
use nth_host::input::{InputBridge, KeyState};
use nth_host::persistence::store::DirectoryStore;
use nth_host::persistence::PersistenceManager;
use nth_host::scheduler::{RenderScheduler, RunState};
use nth_host::session::Session;

use crate::placeholder::PlaceholderEngine;
use crate::rendering::{Renderer, RendererOptions};
use crate::utils::MainArgs;

pub const TITLE: &str = "nth-boy";

mod config;
mod input;
mod placeholder;
mod rendering;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli_options = MainArgs::parse();
    // The logger isn't up yet, so a broken config can only be reported after falling back to defaults.
    let (config, config_error) = match config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (config::FrontConfig::default(), Some(e)),
    };
    let config = cli_options.apply(config);

    let cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("nth_front")
        .add_filter_allow_str("nth_host")
        .build();

    simplelog::SimpleLogger::init(config.log_level, cfg)?;

    if let Some(e) = config_error {
        log::warn!("Failed to load config, using defaults: {:#}", e);
    }

    let scale = NonZeroU32::new(config.scale).context("The display scale must be at least 1")?;
    let save_dir = config.save_dir();
    log::info!("Storing saves in `{}`", save_dir.display());
    log::warn!("No emulation core linked, cartridges run on the placeholder engine");

    let application = Application::new(cli_options, scale, DirectoryStore::new(save_dir))?;

    application.run()
}

struct Application {
    state: State,
    renderer: Renderer,
    scheduler: RenderScheduler,
    bridge: InputBridge<VirtualKeyCode>,

    input: winit_input_helper::WinitInputHelper,

    event_loop: EventLoop<()>,
}

impl Application {
    pub fn new(cli_options: MainArgs, scale: NonZeroU32, store: DirectoryStore) -> anyhow::Result<Application> {
        let event_loop = EventLoop::new();
        let input = winit_input_helper::WinitInputHelper::new();
        let renderer = Renderer::new(&event_loop, RendererOptions::for_scale(scale.get()))?;

        Ok(Application {
            state: State::new(cli_options, store),
            renderer,
            scheduler: RenderScheduler::new(scale),
            bridge: InputBridge::new(input::default_key_map()),
            input,
            event_loop,
        })
    }

    pub fn run(self) -> ! {
        let Application {
            mut state,
            mut renderer,
            mut scheduler,
            bridge,
            mut input,
            event_loop,
        } = self;

        renderer.update_title(&state.status(&scheduler), true);

        event_loop.run(move |event, _window, control_flow| {
            // Handle input events
            if input.update(&event) {
                // Close events
                if input.key_pressed(VirtualKeyCode::Escape) || input.quit() {
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                if let Err(e) = renderer.after_window_update(&input) {
                    log::error!("{:#}", e);
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                // Keep the render loop going for as long as there is an engine to drive.
                if state.session.is_running() || scheduler.state() == RunState::Running {
                    renderer.request_redraw();
                }
            }

            match event {
                Event::WindowEvent { event, window_id } => {
                    if window_id != renderer.primary_window_id() {
                        return;
                    }

                    match event {
                        WindowEvent::DroppedFile(path) => {
                            log::debug!("Dropped file: {:?}", path);
                            state.load_cartridge_file(&path);
                            renderer.update_title(&state.status(&scheduler), true);
                            renderer.request_redraw();
                        }
                        WindowEvent::KeyboardInput { input, .. } => {
                            handle_key(input, &mut state, &bridge);
                        }
                        _ => {}
                    };
                }
                // Draw the current frame
                Event::RedrawRequested(_) => {
                    // A halt stops the redraws, so its notice has to reach the title right away.
                    let mut halted = false;
                    let result = match scheduler.tick(&mut state.session, Instant::now()).map(|f| f.is_some()) {
                        Ok(true) => renderer.render_frame(scheduler.frame()),
                        Ok(false) => {
                            *control_flow = ControlFlow::Wait;
                            renderer.render_frame(scheduler.frame())
                        }
                        Err(e) => {
                            state.halt(&e);
                            halted = true;
                            *control_flow = ControlFlow::Wait;
                            renderer.render_frame(scheduler.frame())
                        }
                    };

                    if let Err(e) = result {
                        *control_flow = ControlFlow::Exit;
                        log::error!("Failed to render {:#}", e);
                        return;
                    }

                    if scheduler.state() == RunState::Running {
                        *control_flow = ControlFlow::Poll;
                    }

                    renderer.update_title(&state.status(&scheduler), halted);
                }
                Event::LoopDestroyed => {
                    if let Err(e) = state.session.persist() {
                        log::error!("Failed to save on exit: {:#}", e);
                    }
                }
                _ => (),
            }
        });
    }
}

pub struct State {
    /// The cartridge that is running, if any
    pub session: Session<PlaceholderEngine, DirectoryStore>,
    /// The last user facing problem, shown in the title bar until the next successful load
    pub notice: Option<String>,
}

impl State {
    pub fn new(cli_options: MainArgs, store: DirectoryStore) -> Self {
        let mut result = Self {
            session: Session::new(PersistenceManager::new(store)),
            notice: None,
        };

        // Set the initial state according to our CLI parameters
        if let Some(initial_rom) = cli_options.rom {
            result.load_cartridge_file(&initial_rom);
        }

        result
    }

    /// Read the cartridge at `path` and swap it in, recording a notice on failure.
    pub fn load_cartridge_file(&mut self, path: &Path) {
        let Some(identity) = utils::cartridge_identity(path) else {
            self.notice = Some(format!("Not a cartridge file: {}", path.display()));
            return;
        };

        // Clear the running instance before reading, so the old render loop halts even if reading fails.
        if let Err(e) = self.session.eject() {
            log::warn!("Failed to save the outgoing cartridge: {:#}", anyhow::Error::new(e));
        }

        let rom = match std::fs::read(path) {
            Ok(rom) => rom,
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                self.notice = Some(format!("Failed to read {}", identity));
                return;
            }
        };

        match self.session.load_cartridge(identity, &rom) {
            Ok(()) => self.notice = None,
            Err(e) => {
                log::error!("{:#}", anyhow::Error::new(e));
                self.notice = Some(format!("Failed to load {}", path.display()));
            }
        }
    }

    /// Record that the running cartridge was halted by a pipeline error.
    pub fn halt(&mut self, error: &CompositeError) {
        self.notice = Some(format!("Emulation halted: {}", error));
    }

    /// Text for the window title.
    pub fn status(&self, scheduler: &RenderScheduler) -> String {
        if let Some(notice) = &self.notice {
            return notice.clone();
        }

        match (self.session.identity(), scheduler.fps()) {
            (Some(identity), Some(fps)) => format!("{} | {} FPS", identity, fps),
            (Some(identity), None) => identity.to_string(),
            (None, _) => "Drop a cartridge to start".to_string(),
        }
    }
}

fn handle_key(input: KeyboardInput, state: &mut State, bridge: &InputBridge<VirtualKeyCode>) {
    let Some(key) = input.virtual_keycode else {
        return;
    };

    let key_state = match input.state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    };

    bridge.handle_key(state.session.engine_mut(), &key, key_state);
}
