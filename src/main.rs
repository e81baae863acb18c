//! Tarot Table
//!
//! Draws tarot spreads onto a resizable table, lists the card meanings and
//! asks a hosted model for an interpretation in the background.

mod app;
mod artwork;
mod config;
mod deck;
mod error;
mod frame;
mod input;
mod layout;
mod oracle;
mod panel;
mod render;
mod spread;
mod theme;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::app::{initial_window_size, AppEvent, Table};
use crate::config::Config;
use crate::deck::Deck;
use crate::input::InputHandler;
use crate::oracle::{HostedOracle, Oracle};
use crate::render::Renderer;
use crate::spread::SpreadKind;

#[derive(Parser, Debug)]
#[command(name = "tarot-table", version, about = "Draw tarot spreads and ask for a reading")]
struct Cli {
    /// JSON config file (defaults to $TAROT_CONFIG or ./tarot.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Card dataset to draw from
    #[arg(long)]
    deck: Option<PathBuf>,

    /// Spread to draw at startup: one, three or celtic
    #[arg(long, value_parser = parse_spread)]
    spread: Option<SpreadKind>,
}

fn parse_spread(name: &str) -> std::result::Result<SpreadKind, String> {
    SpreadKind::from_name(name).ok_or_else(|| format!("unknown spread '{name}' (expected one, three or celtic)"))
}

fn map_winit_key(key: &WinitKey) -> input::Key {
    match key {
        WinitKey::Named(named) => match named {
            NamedKey::Enter => input::Key::Enter,
            NamedKey::Escape => input::Key::Escape,
            NamedKey::Tab => input::Key::Tab,
            NamedKey::Backspace => input::Key::Backspace,
            NamedKey::Delete => input::Key::Delete,
            NamedKey::ArrowLeft => input::Key::Left,
            NamedKey::ArrowRight => input::Key::Right,
            NamedKey::Home => input::Key::Home,
            NamedKey::End => input::Key::End,
            _ => input::Key::Unknown,
        },
        _ => input::Key::Unknown,
    }
}

fn build_oracle(config: &Config) -> Result<Option<Arc<dyn Oracle>>> {
    match config.oracle.api_key() {
        Some(key) => {
            let oracle = HostedOracle::new(&config.oracle, key).context("Failed to build HTTP client")?;
            info!("Readings from {} via {}", config.oracle.model, config.oracle.endpoint);
            Ok(Some(Arc::new(oracle)))
        }
        None => {
            info!("No API key configured; readings are disabled");
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(deck) = cli.deck {
        config.deck = deck;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let deck = Deck::load(&config.deck)
        .with_context(|| format!("Failed to load deck from {}", config.deck.display()))?;
    let oracle = build_oracle(&config)?;

    let (width, height) = initial_window_size(artwork::probe_size(deck.cards()));
    info!("Opening a {}x{} table", width, height);

    let event_loop = EventLoopBuilder::<AppEvent>::with_user_event().build()?;

    let mut table = Table::new(deck, oracle, event_loop.create_proxy(), width, height);
    if let Some(kind) = cli.spread {
        table.draw(kind);
    }

    let mut handler = InputHandler::new();
    let mut window: Option<Arc<Window>> = None;
    let mut renderer: Option<Renderer> = None;

    event_loop.run(move |event, elwt| {
        match event {
            Event::Resumed => {
                if window.is_some() {
                    return;
                }
                elwt.set_control_flow(ControlFlow::Wait);

                let built = match WindowBuilder::new()
                    .with_title("Tarot Reader")
                    .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
                    .build(elwt)
                {
                    Ok(w) => Arc::new(w),
                    Err(e) => {
                        tracing::error!("Failed to create window: {}", e);
                        elwt.exit();
                        return;
                    }
                };

                match Renderer::new(built.clone()) {
                    Ok(r) => {
                        let size = built.inner_size();
                        table.resize(size.width, size.height);
                        renderer = Some(r);
                        built.request_redraw();
                        window = Some(built);
                    }
                    Err(e) => {
                        tracing::error!("Failed to create renderer: {}", e);
                        elwt.exit();
                    }
                }
            }

            Event::UserEvent(app_event) => {
                table.on_app_event(app_event);
                if let Some(w) = &window {
                    w.request_redraw();
                }
            }

            Event::WindowEvent { event: window_event, .. } => {
                match window_event {
                    WindowEvent::CloseRequested => {
                        info!("Close requested");
                        elwt.exit();
                        return;
                    }

                    WindowEvent::Resized(new_size) => {
                        if let Some(r) = &mut renderer {
                            r.resize(new_size.width, new_size.height);
                        }
                        table.resize(new_size.width, new_size.height);
                    }

                    WindowEvent::KeyboardInput { event: key_event, .. } => {
                        let pressed = key_event.state == ElementState::Pressed;
                        let key = map_winit_key(&key_event.logical_key);
                        handler.inject(input::Event::Key { key, pressed });

                        if pressed {
                            if let Some(text) = &key_event.text {
                                for c in text.chars().filter(|c| !c.is_control()) {
                                    handler.inject(input::Event::Text(c));
                                }
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        handler.inject(input::Event::Pointer {
                            position: Vec2::new(position.x as f32, position.y as f32),
                            button: None,
                            pressed: false,
                        });
                    }

                    WindowEvent::MouseInput { state, button, .. } => {
                        let btn = match button {
                            winit::event::MouseButton::Left => Some(input::MouseButton::Left),
                            winit::event::MouseButton::Right => Some(input::MouseButton::Right),
                            winit::event::MouseButton::Middle => Some(input::MouseButton::Middle),
                            _ => None,
                        };
                        if let Some(btn) = btn {
                            handler.inject(input::Event::Pointer {
                                position: handler.pointer_position(),
                                button: Some(btn),
                                pressed: state == ElementState::Pressed,
                            });
                        }
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let d = match delta {
                            winit::event::MouseScrollDelta::LineDelta(x, y) => {
                                Vec2::new(x * 3.0 * theme::LINE_HEIGHT, y * 3.0 * theme::LINE_HEIGHT)
                            }
                            winit::event::MouseScrollDelta::PixelDelta(p) => Vec2::new(p.x as f32, p.y as f32),
                        };
                        handler.inject(input::Event::Scroll { delta: d });
                    }

                    WindowEvent::RedrawRequested => {
                        let started = instant::Instant::now();
                        let frame = table.redraw();
                        if let Some(r) = &mut renderer {
                            if let Err(e) = r.present(frame) {
                                tracing::error!("Render error: {}", e);
                            }
                        }
                        debug!("Redrew {}x{} in {:?}", frame.width(), frame.height(), started.elapsed());
                        return;
                    }

                    _ => return,
                }

                for ev in handler.poll() {
                    table.handle_event(ev);
                }
                if !table.is_running() {
                    elwt.exit();
                    return;
                }
                if let Some(w) = &window {
                    w.request_redraw();
                }
            }

            _ => {}
        }
    })?;

    Ok(())
}
