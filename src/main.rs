use clap::Parser;
use meridian::account::keystore::FileVault;
use meridian::account::unlock::{PasswordSource, UnlockController};
use meridian::cli::dispatch::Dispatcher;
use meridian::cli::{session, Cli};
use meridian::client::RpcClient;
use meridian::config::ConsoleConfig;
use std::io;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = ConsoleConfig::load_or_default(&cli.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rpc_url = cli.addr.unwrap_or_else(|| config.rpc_url.clone());
    let keystore_dir = cli.keystore.unwrap_or_else(|| config.keystore_dir.clone());
    let unlock_list = if cli.unlock.is_empty() {
        config.unlock.clone()
    } else {
        cli.unlock
    };
    let password_file = cli.password.or_else(|| config.password_file.clone());

    // Startup-time unlocks. These are the only failures allowed to
    // terminate the process; everything after this point is contained
    // within a single command.
    if !unlock_list.is_empty() {
        let source = match password_file {
            Some(path) => match read_passwords(&path) {
                Ok(list) => PasswordSource::List(list),
                Err(e) => {
                    eprintln!("Fatal: cannot read password file {}: {}", path, e);
                    std::process::exit(1);
                }
            },
            None => PasswordSource::Prompt,
        };
        let vault = FileVault::new(&keystore_dir);
        let controller = UnlockController::new(&vault, source);
        for (position, account) in unlock_list.iter().enumerate() {
            match controller.unlock(account, position) {
                Ok(unlocked) => println!("Unlocked account {}", unlocked.address),
                Err(e) => {
                    eprintln!("Fatal: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    let dispatcher = Dispatcher::new(RpcClient::new(rpc_url));
    let result = match cli.request {
        // A pre-supplied request bypasses the loop: one dispatch, then done.
        Some(request) => {
            println!("{}", dispatcher.handle(&request).await);
            Ok(())
        }
        None => session::run_session(io::stdin().lock(), &dispatcher).await,
    };
    if let Err(e) = result {
        eprintln!("Fatal: console input failed: {}", e);
        std::process::exit(1);
    }
}

fn read_passwords(path: &str) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .filter(|l| !l.is_empty())
        .collect())
}
