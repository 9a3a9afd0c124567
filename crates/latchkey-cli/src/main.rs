//! Latchkey demo binary.
//!
//! Runs the access controller against mock hardware, with stdin standing in
//! for the card reader: each line is a raw card UID in hexadecimal (e.g.
//! `4A9F4D99`) and is presented to the controller as if a card had been
//! held to the reader. Grant, deny, enrollment and reset outcomes show up
//! as log lines; relay transitions are visible at debug level.
//!
//! # Usage
//!
//! ```bash
//! # Ephemeral store (in-memory EEPROM image)
//! latchkey
//!
//! # Persistent 601-byte EEPROM image, survives restarts
//! latchkey --image /var/lib/latchkey/eeprom.bin
//!
//! # Relay transitions and debounce decisions
//! latchkey --verbose
//! RUST_LOG=latchkey_controller=debug latchkey
//! ```
//!
//! Presenting the master card (`D3EC2B28`) arms enrollment for the next
//! UID typed; the reset card (`B2C82C1B`) wipes the store and reboots the
//! controller in place.

use anyhow::Context;
use clap::Parser;
use latchkey_controller::{Controller, ControllerConfig, ControllerExit};
use latchkey_core::constants::STORE_IMAGE_LEN;
use latchkey_hardware::{
    CardReader, FileNvram, MemoryNvram, MockReader, MockReaderHandle, MockRelay, Nvram,
};
use latchkey_store::{CardStore, provision};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "latchkey", version, about = "Door access controller demo")]
struct Cli {
    /// Path to a persistent EEPROM image (in-memory when omitted)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short)]
    verbose: bool,
}

/// The boxed store type threaded through restarts.
type Store = CardStore<Box<dyn Nvram>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut nvm: Box<dyn Nvram> = match &cli.image {
        Some(path) => {
            info!(path = %path.display(), "using persistent EEPROM image");
            Box::new(
                FileNvram::open(path, STORE_IMAGE_LEN)
                    .with_context(|| format!("cannot open image {}", path.display()))?,
            )
        }
        None => {
            info!("using in-memory EEPROM image");
            Box::new(MemoryNvram::new(STORE_IMAGE_LEN))
        }
    };

    let mut cards = spawn_stdin_reader();
    let config = ControllerConfig::new()?;

    // Reset-triggered restarts rebuild the whole controller from the same
    // backing memory: the boot path reruns and all transient state reverts.
    loop {
        let (reader, reader_handle) = MockReader::new();
        let (relay, _relay_handle) = MockRelay::new();

        let mut controller = boot(nvm, reader, relay, &config).await?;

        let restart = tokio::select! {
            exit = controller.run() => match exit? {
                ControllerExit::RestartRequested => true,
            },
            () = forward_cards(&mut cards, &reader_handle) => false,
        };

        if !restart {
            info!("input closed, shutting down");
            return Ok(());
        }

        info!("restarting controller");
        nvm = controller.into_store().into_inner();
    }
}

/// Boot sequence: reader probe (fatal on failure), store load, factory
/// seeding, stored-card listing.
async fn boot(
    nvm: Box<dyn Nvram>,
    mut reader: MockReader,
    relay: MockRelay,
    config: &ControllerConfig,
) -> anyhow::Result<Controller<MockReader, MockRelay, Box<dyn Nvram>>> {
    let reader_info = reader
        .init()
        .await
        .context("card reader initialization failed, cannot operate without a reader")?;
    info!(reader = %reader_info.name, "card reader ready");

    let mut store: Store = CardStore::new(nvm)?;
    let count = store.load()?;
    info!(count, "card store loaded");

    let factory = provision::factory_cards()?;
    provision::seed(&mut store, &factory)?;

    for uid in store.cards()? {
        debug!(%uid, "authorized card");
    }

    Ok(Controller::new(reader, relay, store, config.clone()))
}

/// Bridge parsed stdin UIDs to the mock reader until the channel closes.
async fn forward_cards(cards: &mut mpsc::UnboundedReceiver<Vec<u8>>, reader: &MockReaderHandle) {
    while let Some(uid) = cards.recv().await {
        if let Err(err) = reader.present_card(uid).await {
            warn!(%err, "card not presentable");
        }
    }
}

/// Read stdin lines and parse each as raw UID bytes.
///
/// The task lives for the whole process, across controller restarts; the
/// returned channel closes when stdin does.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Vec<u8>> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_uid_line(&line) {
                Ok(Some(uid)) => {
                    if tx.send(uid).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(line = %line, err, "ignoring unparsable input line"),
            }
        }
    });
    rx
}

/// Parse one input line into raw UID bytes.
///
/// Accepts hex with optional whitespace or colon separators
/// (`4A9F4D99`, `4a:9f:4d:99`); blank lines yield `Ok(None)`.
fn parse_uid_line(line: &str) -> Result<Option<Vec<u8>>, &'static str> {
    let hex: String = line
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if hex.is_empty() {
        return Ok(None);
    }
    if hex.len() % 2 != 0 {
        return Err("odd number of hex digits");
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for pair in hex.as_bytes().chunks(2) {
        let pair = std::str::from_utf8(pair).map_err(|_| "invalid hex")?;
        let byte = u8::from_str_radix(pair, 16).map_err(|_| "invalid hex")?;
        bytes.push(byte);
    }
    Ok(Some(bytes))
}
