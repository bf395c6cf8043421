//! CSV projection of accumulated mirror trades

use ::csv::WriterBuilder;
use std::io::Write;
use std::path::Path;

use crate::common::errors::Result;
use crate::common::types::{AssetMove, ManagerMoves, MirrorTrade};

/// `+label (tag)` / `-label (tag)`, tag omitted when absent
pub fn format_move(sign: char, item: &AssetMove) -> String {
    match &item.tag {
        Some(tag) => format!("{}{} ({})", sign, item.label, tag),
        None => format!("{}{}", sign, item.label),
    }
}

/// All of a manager's moves, adds first, joined by `/`
pub fn moves_cell(manager: &ManagerMoves) -> String {
    manager
        .adds
        .iter()
        .map(|item| format_move('+', item))
        .chain(manager.drops.iter().map(|item| format_move('-', item)))
        .collect::<Vec<_>>()
        .join("/")
}

/// One row per trade: time, league, then name and moves per manager
pub fn write_mirror_trades<W: Write>(writer: W, trades: &[MirrorTrade]) -> Result<()> {
    let widest = trades.iter().map(|t| t.managers.len()).max().unwrap_or(0);

    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);

    let mut header = vec!["Time".to_string(), "League".to_string()];
    for i in 1..=widest {
        header.push(format!("Manager {}", i));
        header.push(format!("Moves {}", i));
    }
    wtr.write_record(&header)?;

    for trade in trades {
        let mut row = vec![trade.time.clone(), trade.league_name.clone()];
        for manager in &trade.managers {
            row.push(manager.manager_name.clone());
            row.push(moves_cell(manager));
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the CSV report to `path`
pub fn export_to_path(path: impl AsRef<Path>, trades: &[MirrorTrade]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_mirror_trades(std::io::BufWriter::new(file), trades)
}
