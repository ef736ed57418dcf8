//! The fixed command table: every console command, its required argument
//! count, and its usage hint. The registry gatekeeps arity only; argument
//! interpretation belongs to the dispatcher.

/// Name and required argument count of one console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: usize,
    pub usage: &'static str,
}

/// Closed set of console commands. Adding one is a two-step edit: a variant
/// here (the match arms below will not compile without it) and an execute
/// arm in the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetNodeInfo,
    GetNodeId,
    GetAccounts,
    GetLastAccount,
    GetNewAccount,
    UnlockAccount,
    GetBalance,
    ConnectPeer,
    GetPeers,
    SetMiner,
    StartMine,
    StopMine,
    SendAsset,
}

impl Command {
    pub const ALL: [Command; 13] = [
        Command::GetNodeInfo,
        Command::GetNodeId,
        Command::GetAccounts,
        Command::GetLastAccount,
        Command::GetNewAccount,
        Command::UnlockAccount,
        Command::GetBalance,
        Command::ConnectPeer,
        Command::GetPeers,
        Command::SetMiner,
        Command::StartMine,
        Command::StopMine,
        Command::SendAsset,
    ];

    pub fn spec(self) -> &'static CommandSpec {
        match self {
            Command::GetNodeInfo => &CommandSpec {
                name: "getnodeinfo",
                arity: 0,
                usage: "getnodeinfo",
            },
            Command::GetNodeId => &CommandSpec {
                name: "getnodeid",
                arity: 0,
                usage: "getnodeid",
            },
            Command::GetAccounts => &CommandSpec {
                name: "getaccounts",
                arity: 0,
                usage: "getaccounts",
            },
            Command::GetLastAccount => &CommandSpec {
                name: "getlastaccount",
                arity: 0,
                usage: "getlastaccount",
            },
            Command::GetNewAccount => &CommandSpec {
                name: "getnewaccount",
                arity: 1,
                usage: "getnewaccount <password>",
            },
            Command::UnlockAccount => &CommandSpec {
                name: "unlockaccount",
                arity: 2,
                usage: "unlockaccount <address> <password>",
            },
            Command::GetBalance => &CommandSpec {
                name: "getbalance",
                arity: 1,
                usage: "getbalance <address>",
            },
            Command::ConnectPeer => &CommandSpec {
                name: "connectpeer",
                arity: 1,
                usage: "connectpeer <peerURL>",
            },
            Command::GetPeers => &CommandSpec {
                name: "getpeers",
                arity: 0,
                usage: "getpeers",
            },
            Command::SetMiner => &CommandSpec {
                name: "setminer",
                arity: 1,
                usage: "setminer <address>",
            },
            Command::StartMine => &CommandSpec {
                name: "startmine",
                arity: 0,
                usage: "startmine",
            },
            Command::StopMine => &CommandSpec {
                name: "stopmine",
                arity: 0,
                usage: "stopmine",
            },
            Command::SendAsset => &CommandSpec {
                name: "sendasset",
                arity: 3,
                usage: "sendasset <fromAddress> <toAddress> <amount>",
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn arity(self) -> usize {
        self.spec().arity
    }

    pub fn usage(self) -> &'static str {
        self.spec().usage
    }

    /// Look up a lower-cased command name.
    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL.iter().copied().find(|c| c.name() == name)
    }
}
