//! Terminal summaries.

use colored::Colorize;

use camara_graph::{GraphCounts, SyncResult};

/// Print the outcome of an ingestion run.
pub fn print_sync_result(title: &str, result: &SyncResult) {
    println!("\n{}", format!("{title} complete:").green().bold());
    println!("  Nodes upserted:        {}", result.nodes_upserted.to_string().cyan());
    println!("  Relationships created: {}", result.relationships_created.to_string().cyan());

    let skipped = result.items_skipped.to_string();
    if result.items_skipped > 0 {
        println!("  Items skipped:         {}", skipped.yellow());
    } else {
        println!("  Items skipped:         {}", skipped.dimmed());
    }
}

/// Print store-wide counts.
pub fn print_counts(uri: &str, counts: &GraphCounts) {
    println!("{}", "Knowledge Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  Server:        {}", uri.dimmed());
    println!("  Nodes:         {}", counts.nodes.to_string().cyan());
    println!("  Relationships: {}", counts.relationships.to_string().cyan());
    println!("{}", "─".repeat(40));
}
