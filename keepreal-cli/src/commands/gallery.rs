//! Gallery command - print the locally cached records for an owner.

use anyhow::Result;
use colored::Colorize;
use keepreal_core::{Config, ConfirmationState, GalleryCache, Record};

use crate::utils;

pub fn execute(owner: String) -> Result<()> {
    let config = Config::from_env();
    let cache = GalleryCache::new(config.data_dir);

    let records = cache.load(&owner)?;
    if records.is_empty() {
        println!("{}", format!("No memories cached for {owner}").dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("🖼  {} memories for {owner}", records.len()).bold()
    );
    println!();
    for (index, record) in records.iter().enumerate() {
        print_record(index, record);
    }

    Ok(())
}

fn print_record(index: usize, record: &Record) {
    let state = match record.state {
        ConfirmationState::Confirmed => "confirmed".green(),
        ConfirmationState::Pending => "pending".yellow(),
        ConfirmationState::Unconfirmed => "unconfirmed".red(),
    };

    let caption = if record.caption.is_empty() {
        "(no caption)".dimmed().to_string()
    } else {
        format!("\"{}\"", record.caption)
    };

    println!("{:>3}. {} [{}]", index + 1, caption, state);
    println!("     {} {}", "Record:".dimmed(), record.id);
    println!("     {} {}", "Image CID:".dimmed(), record.content_id);
    if let Some(timestamp) = record.timestamp {
        println!(
            "     {} {}",
            "Captured:".dimmed(),
            utils::format_timestamp(timestamp)
        );
    }
    if let Some(location) = &record.location {
        if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
            println!("     {} {lat},{lon}", "Location:".dimmed());
        }
    }
    println!();
}
