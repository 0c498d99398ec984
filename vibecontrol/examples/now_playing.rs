//! Terminal now-playing display driven by the playback engine.
//!
//! Reads the proxy location from the vibemusic configuration (or
//! `VIBEMUSIC_CONFIG__ACCOUNTS__SPOTIFY__API_BASE`), then prints the view on
//! every change. Commands on stdin:
//!
//! ```text
//!   p  play/pause      n  next      b  previous
//!   r  recently played q  quit
//! ```
//!
//! Usage:
//!   VIBEMUSIC_CONFIG__ACCOUNTS__SPOTIFY__SESSION_COOKIE='access_token=...' \
//!   cargo run -p vibecontrol --example now_playing

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;
use vibeconfig::get_config;
use vibecontrol::{EngineEvent, PlaybackEngine, PlaybackView};
use vibespotify::SpotifyConfigExt;

fn init_tracing(default_level: &str, enable_console: bool) {
    if !enable_console {
        return;
    }
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn render(view: &PlaybackView, upcoming: &[vibecontrol::Track]) {
    let Some(track) = &view.track else {
        println!("-- nothing playing --");
        return;
    };
    let state = if view.is_playing { ">" } else { "||" };
    println!(
        "{} {} - {}  [{} / {}]",
        state,
        track.name,
        track.artist_line(),
        view.progress_label(),
        view.duration_label()
    );
    if !upcoming.is_empty() {
        let names: Vec<&str> = upcoming.iter().map(|t| t.name.as_str()).collect();
        println!("   up next: {}", names.join(" | "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = get_config();
    init_tracing(
        &config.get_log_min_level()?,
        config.get_log_enable_console()?,
    );

    let engine = PlaybackEngine::from_config(&config)?;
    let recent_limit = config.get_recently_played_limit()?;
    let mut view = engine.subscribe();
    let mut events = engine.events();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    engine.activate();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                render(&current, &engine.upcoming());
            }
            event = events.recv() => match event {
                Ok(EngineEvent::Unauthorized { message }) => {
                    eprintln!("Session expired ({message}), log in again through the web app");
                    break;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                let result = match line.trim() {
                    "p" => engine.toggle_play_pause().await.map(|_| ()),
                    "n" => engine.next().await.map(|_| ()),
                    "b" => engine.previous().await.map(|_| ()),
                    "r" => engine.recently_played(recent_limit).await.map(|items| {
                        for item in items {
                            println!("   {} - {}", item.track.name, item.track.artist_line());
                        }
                    }),
                    "q" => break,
                    _ => Ok(()),
                };
                if let Err(err) = result {
                    eprintln!("Command failed: {err}");
                }
            }
        }
    }

    engine.deactivate();
    Ok(())
}
