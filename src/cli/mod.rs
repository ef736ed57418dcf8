pub mod dispatch;
pub mod registry;
pub mod session;

use clap::Parser;

#[derive(Parser)]
#[command(name = "meridian")]
#[command(about = "Meridian node admin console", long_about = None)]
pub struct Cli {
    /// Address of the node RPC endpoint
    #[arg(long)]
    pub addr: Option<String>,
    /// Path to the console config file
    #[arg(long, default_value = "console.toml")]
    pub config: String,
    /// Key file directory
    #[arg(long)]
    pub keystore: Option<String>,
    /// Accounts to unlock at startup (address or keystore index)
    #[arg(long, value_delimiter = ',')]
    pub unlock: Vec<String>,
    /// File with one password per unlock entry
    #[arg(long)]
    pub password: Option<String>,
    /// Run a single request instead of the interactive session
    pub request: Option<String>,
}
