mod config;

use config::HuddleConfig;
use huddle_api::events::{ClientEvent, ServerEvent};
use huddle_api::types::{Identity, UserId};
use huddle_core::auth::InMemoryAuthenticator;
use huddle_core::blob::InMemoryBlobStore;
use huddle_core::directory::InMemoryDirectory;
use huddle_core::store::InMemoryMessageStore;
use huddle_core::Core;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::mpsc;

#[derive(thiserror::Error, Debug)]
enum DaemonError {
    #[error("config")]
    Config,
    #[error("bind")]
    Bind,
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let args: Vec<String> = std::env::args().collect();
    let mut path = PathBuf::from("huddle.toml");
    let mut i = 1;
    while i + 1 < args.len() {
        if args[i] == "--config" {
            path = PathBuf::from(&args[i + 1]);
        }
        i += 1;
    }
    let cfg = config::load_config(&path).map_err(|_| DaemonError::Config)?;
    init_logging(&cfg);
    let core = init_core(&cfg).await;
    let listener = TcpListener::bind(&cfg.server.bind)
        .await
        .map_err(|_| DaemonError::Bind)?;
    log::info!("listening on {}", cfg.server.bind);
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        log::debug!("accepted {}", peer);
                        let core = core.clone();
                        tokio::spawn(handle_connection(core, stream));
                    }
                    Err(err) => log::warn!("accept failed: {}", err),
                }
            }
            _ = ctrl_c.as_mut() => {
                log::info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}

fn init_logging(cfg: &HuddleConfig) {
    let level = match cfg.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

async fn init_core(cfg: &HuddleConfig) -> Core {
    let auth = Arc::new(InMemoryAuthenticator::new());
    for entry in cfg.tokens.iter() {
        auth.insert(
            &entry.token,
            Identity {
                user_id: UserId::new(entry.user_id.clone()),
                display_name: entry.display_name.clone(),
                role: entry.role,
            },
        )
        .await;
    }
    Core::new(
        cfg.core.clone(),
        auth,
        Arc::new(InMemoryMessageStore::new()),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(InMemoryDirectory::new()),
    )
}

// First line is the bearer credential; every further line is one JSON
// client event. Server events are written back as JSON lines.
async fn handle_connection(core: Core, stream: TcpStream) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let credential = match lines.next_line().await {
        Ok(Some(line)) => line,
        _ => return,
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection_id = match core.connect(credential.trim(), tx).await {
        Ok(id) => id,
        Err(err) => {
            let rejection = ServerEvent::Error {
                message: err.to_string(),
            };
            if let Ok(line) = serde_json::to_string(&rejection) {
                let _ = writer.write_all(line.as_bytes()).await;
                let _ = writer.write_all(b"\n").await;
            }
            return;
        }
    };
    let writer_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(err) => {
                    log::warn!("unserializable event: {}", err);
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ClientEvent>(&line) {
            Ok(event) => core.handle_client_event(connection_id, event).await,
            Err(err) => log::debug!("ignoring malformed client event: {}", err),
        }
    }
    core.disconnect(connection_id).await;
    writer_task.abort();
}
