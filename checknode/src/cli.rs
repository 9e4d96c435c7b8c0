use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "checknode")]
#[command(about = "Check sync status of cluster blockchain nodes", long_about = None)]
pub struct Cli {
    /// Chain to check (e.g. eth, bsc, arb, poly); all configured nodes when omitted
    #[arg(value_name = "CHAIN")]
    pub chain: Option<String>,

    /// Path to the node registry [default: $HOME/bin/nodes_conf.toml]
    #[arg(short, long, value_name = "FILE", env = "CHECKNODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
