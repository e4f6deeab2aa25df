use std::path::PathBuf;

use macroquad::prelude::*;

use crime_client::engine::sandbox::Terrain;
use crime_client::engine::{Coords, SandboxEngine};
use crime_client::input::{InputCommand, InputHandler};
use crime_client::network::{ConnectionState, NetworkClient};
use crime_client::render::{HudInfo, Renderer};
use crime_client::ui::{Overlay, Presentation};
use crime_client::{ClientConfig, CrimeClient};

/// Frames the sandbox takes to stream a model in
const SANDBOX_STREAM_FRAMES: u32 = 12;

fn window_conf() -> Conf {
    Conf {
        window_title: "Mr Crime".to_string(),
        window_width: 1280,
        window_height: 720,
        fullscreen: false,
        ..Default::default()
    }
}

fn load_config() -> ClientConfig {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("client.toml"));
    match ClientConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}, using defaults", e);
            ClientConfig::default()
        }
    }
}

fn sandbox(config: &ClientConfig) -> SandboxEngine {
    let mut engine = SandboxEngine::new();
    engine.set_terrain(Terrain::Rolling {
        base: 29.0,
        amplitude: 2.5,
        wavelength: 90.0,
    });
    engine.set_stream_frames(SANDBOX_STREAM_FRAMES);

    // Start a few steps away from Mr Crime
    let npc = config.npc.coords;
    engine.player = Coords::new(npc.x + 6.0, npc.y - 4.0, npc.z);
    engine.move_player(0.0, 0.0);
    engine
}

fn apply_input(client: &mut CrimeClient<SandboxEngine, Overlay>, commands: Vec<InputCommand>) {
    for command in commands {
        match command {
            InputCommand::Move { dx, dy } => client.engine_mut().move_player(dx, dy),
            InputCommand::Interact => {
                if let Some(event) = client.engine().interact() {
                    client.dispatch(event);
                }
            }
            InputCommand::MenuMove(delta) => client.presenter_mut().move_selection(delta),
            InputCommand::MenuConfirm => {
                if let Some(event) = client.presenter().confirm() {
                    client.dispatch(event);
                }
            }
            InputCommand::MenuPick(n) => {
                if let Some(event) = client.presenter().pick(n) {
                    client.dispatch(event);
                }
            }
            InputCommand::MenuClose => client.presenter_mut().close_menu(),
            InputCommand::Command(name) => {
                client.run_command(name);
            }
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    // Set panic hook for native builds to capture crash info
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Some(location) = panic_info.location() {
            eprintln!("  at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    let config = load_config();
    let mut client = CrimeClient::new(sandbox(&config), Overlay::new(), &config);
    let mut network = NetworkClient::new(&config.server_url, &config.player_name);
    let mut input_handler = InputHandler::new();
    let renderer = Renderer::new();

    loop {
        let delta = get_frame_time();

        for event in network.poll(delta) {
            client.handle_server_event(event);
        }

        let commands = input_handler.process(client.presenter().is_menu_open(), delta);
        apply_input(&mut client, commands);

        client.engine_mut().advance_streaming();
        client.update(delta);
        client.presenter_mut().update(delta);

        for msg in client.take_outgoing() {
            network.send(&msg);
        }

        let connection = match network.state() {
            ConnectionState::Connected => "verbunden",
            ConnectionState::Connecting => "verbinde...",
            ConnectionState::Disconnected if network.reconnection_failed() => "getrennt",
            ConnectionState::Disconnected => "warte...",
        };
        let hud = HudInfo {
            connection,
            player_id: client.player_id(),
        };
        renderer.render(client.engine(), client.missions(), client.presenter(), &hud);

        next_frame().await;
    }
}
