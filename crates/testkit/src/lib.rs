#![warn(missing_docs)]
//! Test surfaces for the sort engine: a click-rule model, vanilla menu
//! layouts and a recording interaction sink.

mod click_model;
pub mod fixtures;

use anyhow::Result;
use clientsort_net::{Click, InteractionSink, SortPayload};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

pub use click_model::ClickModel;

/// One event a [`RecordingSink`] received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Recorded {
    /// A slot click.
    Click(Click),
    /// A remote sort message.
    Sort(SortPayload),
}

/// Interaction sink that keeps everything it receives. Clones share the log,
/// so a test can keep one while the dispatcher owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    pub fn events(&self) -> Vec<Recorded> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clicks received so far.
    pub fn clicks(&self) -> Vec<Click> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Recorded::Click(click) => Some(click),
                Recorded::Sort(_) => None,
            })
            .collect()
    }

    /// Write the log as newline-delimited JSON.
    pub fn write_jsonl<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        for event in self.events() {
            let line = serde_json::to_string(&event)?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    fn record(&self, event: Recorded) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl InteractionSink for RecordingSink {
    fn click(&mut self, click: &Click) {
        self.record(Recorded::Click(*click));
    }

    fn send_sort(&mut self, payload: &SortPayload) {
        self.record(Recorded::Sort(payload.clone()));
    }
}
