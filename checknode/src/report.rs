//! Human-readable and JSON rendering of check results

use std::collections::BTreeMap;
use std::fmt;

use crate::types::NodeResult;

/// Text report: one block per node; the peers line is omitted for chains
/// without peer count
pub struct TextReport<'a>(pub &'a BTreeMap<String, NodeResult>);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (chain, result) in self.0 {
            writeln!(f, "Node: {}", chain)?;
            writeln!(f, "Sync status: {}", result.sync_status)?;
            writeln!(f, "Node block number: {}", result.node_block)?;
            writeln!(f, "Scanner block number: {}", result.latest_block)?;
            writeln!(f, "Diff with mainnet: {}", result.diff)?;
            if let Some(peers) = result.peers_count {
                writeln!(f, "Peers count: {}", peers)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn render_text(results: &BTreeMap<String, NodeResult>) -> String {
    TextReport(results).to_string()
}

pub fn render_json(results: &BTreeMap<String, NodeResult>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Requested chains that produced no result
pub fn missing_chains<'a>(
    requested: impl IntoIterator<Item = &'a str>,
    results: &BTreeMap<String, NodeResult>,
) -> Vec<String> {
    requested
        .into_iter()
        .filter(|chain| !results.contains_key(*chain))
        .map(str::to_string)
        .collect()
}
