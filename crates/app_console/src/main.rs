use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use app_console::Console;
use config::{AppConfig, ConfigStore, StorageBackend};
use core_notes::{AuthGate, FixedCredentials, NotePersistence};
use core_types::KeyValueStore;
use i18n::I18n;
use storage_json::{JsonFileStore, MemoryStore, default_store_dir_from};
use storage_sqlite::SqliteKvStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.push("carnet");
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let config_store = ConfigStore::from_dir(data_dir.join("config"));
    let config = match config_store.load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err:#}");
            AppConfig::default()
        }
    };

    let persistence = NotePersistence::new(open_backend(&config, &data_dir));
    let mut gate = AuthGate::new(FixedCredentials::new(
        config.auth.username.clone(),
        config.auth.password.clone(),
    ));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), I18n::new(config.language));
    if let Err(err) = console.run(&mut gate, persistence) {
        error!("console stopped: {err:#}");
        eprintln!("{err:#}");
    }
    info!("session closed");
}

fn open_backend(config: &AppConfig, data_dir: &Path) -> Box<dyn KeyValueStore> {
    match config.storage.backend {
        StorageBackend::JsonFile => {
            let store = JsonFileStore::from_dir(default_store_dir_from(data_dir));
            info!(path = %store.path().display(), "using json file store");
            Box::new(store)
        }
        StorageBackend::Sqlite => match SqliteKvStore::open(data_dir.join("carnet.db")) {
            Ok(store) => Box::new(store),
            Err(err) => {
                error!("failed to open sqlite store, notes stay in memory: {err:#}");
                Box::new(MemoryStore::new())
            }
        },
    }
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "carnet.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,app_console=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
