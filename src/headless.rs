use anyhow::{Context, Result};
use clientsort_core::{ItemStack, MenuSnapshot};
use clientsort_net::{
    encode_client_message, ClientMessage, Click, InteractionEvent, InteractionSink, QueuedEvent,
    SortPayload, Waiter,
};
use clientsort_sort::{
    Catalog, InventoryLocks, Peer, Planner, RefreshOutcome, ScreenKind, SortContext, SortOptions,
    SortOrder, SortPlan, SoundAction, SoundThrottle,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{info, warn};

pub struct HeadlessConfig {
    pub options: SortOptions,
    pub menu: MenuSnapshot,
    pub anchor: usize,
    pub order: SortOrder,
    pub screen: ScreenKind,
    pub remote: bool,
    pub locked: Vec<usize>,
    pub catalog: Option<PathBuf>,
    pub dispatch: bool,
    pub peer: Peer,
    pub transcript: Option<PathBuf>,
}

/// Read a menu snapshot from a JSON file.
pub fn load_menu(path: &Path) -> Result<MenuSnapshot> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse menu snapshot {}", path.display()))
}

fn load_reference(path: &Path) -> Result<Vec<ItemStack>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse catalog list {}", path.display()))
}

pub fn run(cfg: HeadlessConfig) -> Result<()> {
    let catalog = Arc::new(Catalog::new(Arc::new(Mutex::new(()))));
    if let Some(path) = &cfg.catalog {
        let reference = load_reference(path)?;
        match catalog.refresh(reference, &cfg.options) {
            RefreshOutcome::Spawned(worker) => {
                if worker.join().is_err() {
                    warn!("Catalog index builder panicked, sorting without it");
                }
            }
            outcome => info!(?outcome, "Catalog refreshed"),
        }
    }

    let planner = Planner::new(cfg.options.clone(), catalog)
        .with_locks(Arc::new(InventoryLocks::new(cfg.locked.iter().copied())));
    let ctx = SortContext {
        menu: &cfg.menu,
        screen: cfg.screen,
        remote_available: cfg.remote,
    };
    let plan = planner.plan(&ctx, cfg.anchor, cfg.order);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if plan.is_noop() {
        writeln!(out, "nothing to sort at slot {}", cfg.anchor)?;
        return Ok(());
    }
    writeln!(
        out,
        "{} sort of {} slots: {} events ({:?})",
        cfg.order,
        plan.working_set.len(),
        plan.events.len(),
        plan.route
    )?;
    drop(out);

    if !cfg.dispatch {
        let mut out = std::io::stdout().lock();
        for queued in &plan.events {
            writeln!(out, "{} [{:?}]", queued.event, queued.waiter)?;
        }
        return Ok(());
    }

    let transcript = match &cfg.transcript {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => None,
    };
    let sink = ConsoleSink::new(&cfg.options, transcript);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let sink = runtime.block_on(dispatch(plan, sink, cfg.options.tick_interval(cfg.peer)))?;
    sink.finish()
}

/// Pace the plan through a dispatcher and wait until every event is out.
async fn dispatch(
    plan: SortPlan,
    sink: ConsoleSink,
    tick: std::time::Duration,
) -> Result<ConsoleSink> {
    let started = Instant::now();
    let (handle, task) = clientsort_net::spawn(sink, tick);
    let (done_tx, done_rx) = oneshot::channel();

    handle.push_all(plan.events)?;
    handle.push(QueuedEvent::new(
        InteractionEvent::callback(move || {
            let _ = done_tx.send(());
        }),
        Waiter::Tick,
    ))?;
    done_rx
        .await
        .context("dispatcher stopped before the sort finished")?;

    drop(handle);
    let sink = task.await.context("dispatcher task failed")?;
    info!(elapsed = ?started.elapsed(), "Sort dispatched");
    Ok(sink)
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum TranscriptLine<'a> {
    Click {
        click: &'a Click,
        sound: bool,
    },
    Sort {
        payload: &'a SortPayload,
        frame_bytes: usize,
    },
}

/// Prints delivered events, deciding click sounds as the host would.
struct ConsoleSink {
    sounds: SoundThrottle,
    transcript: Option<BufWriter<File>>,
    clicks: usize,
    played: usize,
    sorts: usize,
}

impl ConsoleSink {
    fn new(options: &SortOptions, transcript: Option<BufWriter<File>>) -> Self {
        Self {
            sounds: SoundThrottle::new(options),
            transcript,
            clicks: 0,
            played: 0,
            sorts: 0,
        }
    }

    fn record(&mut self, line: &TranscriptLine<'_>) {
        let Some(writer) = self.transcript.as_mut() else {
            return;
        };
        let written = serde_json::to_writer(&mut *writer, line)
            .map_err(anyhow::Error::from)
            .and_then(|()| writer.write_all(b"\n").map_err(anyhow::Error::from));
        if let Err(err) = written {
            warn!(%err, "Failed to write transcript, disabling it");
            self.transcript = None;
        }
    }

    fn finish(mut self) -> Result<()> {
        if let Some(writer) = self.transcript.as_mut() {
            writer.flush().context("failed to flush transcript")?;
        }
        println!(
            "sent {} clicks ({} with sound) and {} sort messages",
            self.clicks, self.played, self.sorts
        );
        Ok(())
    }
}

impl InteractionSink for ConsoleSink {
    fn click(&mut self, click: &Click) {
        self.clicks += 1;
        let sound = match click.pitch {
            Some(pitch) => match self.sounds.on_click(Instant::now()) {
                SoundAction::Play { stop_previous } => {
                    self.played += 1;
                    println!(
                        "click slot {} button {} (pitch {pitch:.2}{})",
                        click.slot_id,
                        click.button.id(),
                        if stop_previous { ", stop previous" } else { "" }
                    );
                    true
                }
                SoundAction::Skip => false,
            },
            None => false,
        };
        if !sound {
            println!("click slot {} button {}", click.slot_id, click.button.id());
        }
        self.record(&TranscriptLine::Click { click, sound });
    }

    fn send_sort(&mut self, payload: &SortPayload) {
        self.sorts += 1;
        let frame_bytes =
            match encode_client_message(&ClientMessage::ReorderInventory(payload.clone())) {
                Ok(frame) => frame.len(),
                Err(err) => {
                    warn!(%err, "Failed to encode sort message");
                    return;
                }
            };
        println!(
            "sort {} pairs in menu {} ({frame_bytes} bytes)",
            payload.pair_count(),
            payload.container_id
        );
        self.record(&TranscriptLine::Sort {
            payload,
            frame_bytes,
        });
    }
}
