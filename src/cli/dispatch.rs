//! One line of operator input in, one block of rendered output back. The
//! dispatcher never propagates an error: every failure is rendered to a
//! single human-readable line and the session carries on.

use crate::cli::registry::Command;
use crate::client::NodeApi;
use crate::encoding::{parse_amount, scale_for_display, Address};
use crate::error::ConsoleError;

pub struct Dispatcher<N> {
    pub(crate) node: N,
}

impl<N: NodeApi> Dispatcher<N> {
    pub fn new(node: N) -> Self {
        Dispatcher { node }
    }

    /// Handle one raw input line. Always returns printable output, never an
    /// error: usage, decode and remote failures all render here.
    pub async fn handle(&self, raw: &str) -> String {
        // The whole line is lower-cased before tokenizing, passwords
        // included. See DESIGN.md, open questions.
        let line = raw.trim().to_lowercase();
        if line.is_empty() {
            return "please enter a command".to_string();
        }
        let tokens: Vec<&str> = line.split(' ').collect();

        let cmd = match Command::from_name(tokens[0]) {
            Some(cmd) => cmd,
            None => return ConsoleError::UnknownCommand(tokens[0].to_string()).to_string(),
        };
        if tokens.len() - 1 != cmd.arity() {
            return ConsoleError::Usage(cmd.usage()).to_string();
        }

        match self.execute(cmd, &tokens[1..]).await {
            Ok(output) => output,
            Err(e) => e.to_string(),
        }
    }

    async fn execute(&self, cmd: Command, args: &[&str]) -> Result<String, ConsoleError> {
        match cmd {
            Command::GetNodeInfo => {
                let info = self.node.node_info().await?;
                Ok(serde_json::to_string_pretty(&info).unwrap_or_else(|_| info.to_string()))
            }
            Command::GetNodeId => Ok(self.node.node_id().await?),
            Command::GetAccounts => {
                let accounts = self.node.accounts().await?;
                if accounts.is_empty() {
                    // Unlike getpeers, this one prints the empty structure
                    // verbatim. Intentional; do not unify.
                    return Ok("[]".to_string());
                }
                Ok(accounts
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::GetLastAccount => match self.node.last_account().await? {
                Some(address) => Ok(address.to_string()),
                None => Ok("no account found".to_string()),
            },
            Command::GetNewAccount => {
                let address = self.node.new_account(args[0]).await?;
                Ok(address.to_string())
            }
            Command::UnlockAccount => {
                let address: Address = args[0].parse()?;
                self.node.unlock_account(&address, args[1]).await?;
                Ok(format!("account {} unlocked", address))
            }
            Command::GetBalance => {
                let address: Address = args[0].parse()?;
                let balance = self.node.balance(&address).await?;
                Ok(format!("balance: {}", scale_for_display(&balance)))
            }
            Command::ConnectPeer => {
                self.node.connect_peer(args[0]).await?;
                Ok(format!("connecting to {}", args[0]))
            }
            Command::GetPeers => {
                let peers = self.node.peers().await?;
                if peers.is_empty() {
                    return Ok("no peers connected".to_string());
                }
                Ok(peers.join("\n"))
            }
            Command::SetMiner => {
                let address: Address = args[0].parse()?;
                self.node.set_miner(&address).await?;
                Ok(format!("miner set to {}", address))
            }
            Command::StartMine => {
                self.node.start_mine().await?;
                Ok("mining started".to_string())
            }
            Command::StopMine => {
                self.node.stop_mine().await?;
                Ok("mining stopped".to_string())
            }
            Command::SendAsset => {
                let from: Address = args[0].parse()?;
                let to: Address = args[1].parse()?;
                let amount = parse_amount(args[2])?;
                let tx_hash = self.node.send_asset(&from, &to, &amount).await?;
                Ok(format!("tx: {}", tx_hash))
            }
        }
    }
}
