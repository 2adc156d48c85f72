use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use slotlink_engine::{Mailbox, SlotConfig, SlotFlag, UpdateRate};
use slotlink_transport::LinkTransport;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SlotRow {
    index: usize,
    name: String,
    kind: String,
    rate: String,
    direction: &'static str,
    value: String,
    flag: &'static str,
    awaiting_ack: bool,
}

#[derive(Serialize)]
struct PeerState {
    peer: String,
    round: u8,
    faults: String,
    slots: Vec<SlotRow>,
}

fn rate_label(rate: UpdateRate) -> String {
    match rate {
        UpdateRate::EveryRounds(n) if n.get() == 1 => "every round".to_string(),
        UpdateRate::EveryRounds(n) => format!("every {n} rounds"),
        UpdateRate::Async => "async".to_string(),
    }
}

fn flag_label(flag: SlotFlag) -> &'static str {
    match flag {
        SlotFlag::None => "-",
        SlotFlag::TransmitPending => "tx-pending",
        SlotFlag::ReceivePending => "rx-pending",
    }
}

fn collect_state<T: LinkTransport>(mailbox: &Mailbox<T>, slots: &[SlotConfig]) -> PeerState {
    let local = mailbox.local();
    let rows = slots
        .iter()
        .enumerate()
        .map(|(index, config)| {
            let read = mailbox.peek(index).ok();
            SlotRow {
                index,
                name: config.name.clone(),
                kind: config.kind().to_string(),
                rate: rate_label(config.rate),
                direction: if config.source == local { "tx" } else { "rx" },
                value: read
                    .map(|r| r.value.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                flag: read.map(|r| flag_label(r.flag)).unwrap_or("?"),
                awaiting_ack: mailbox.awaiting_ack(index),
            }
        })
        .collect();
    PeerState {
        peer: local.to_string(),
        round: mailbox.round(),
        faults: mailbox.faults().to_string(),
        slots: rows,
    }
}

/// Print one peer's slot table, round, and fault set.
pub fn print_peer_state<T: LinkTransport>(
    mailbox: &Mailbox<T>,
    slots: &[SlotConfig],
    format: OutputFormat,
) {
    let state = collect_state(mailbox, slots);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&state).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "IDX", "NAME", "KIND", "RATE", "DIR", "VALUE", "FLAG", "AWAIT",
                ]);
            for row in &state.slots {
                table.add_row(vec![
                    row.index.to_string(),
                    row.name.clone(),
                    row.kind.clone(),
                    row.rate.clone(),
                    row.direction.to_string(),
                    row.value.clone(),
                    row.flag.to_string(),
                    if row.awaiting_ack { "yes" } else { "" }.to_string(),
                ]);
            }
            println!(
                "peer={} round={} faults={}",
                state.peer, state.round, state.faults
            );
            println!("{table}");
        }
    }
}

/// Print a slot table description without engine state.
pub fn print_table_config(slots: &[SlotConfig], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(slots).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["IDX", "NAME", "KIND", "RATE", "SRC", "DST", "INITIAL"]);
            for (index, config) in slots.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    config.name.clone(),
                    config.kind().to_string(),
                    rate_label(config.rate),
                    config.source.to_string(),
                    config.destination.to_string(),
                    config.initial.to_string(),
                ]);
            }
            println!("{table}");
        }
    }
}
