//! The interactive session: read one line, dispatch it, print the result,
//! repeat until the exit literal or end of input.

use crate::cli::dispatch::Dispatcher;
use crate::client::NodeApi;
use std::io::{self, BufRead, Write};

pub const EXIT_COMMAND: &str = "exit";
const PROMPT: &str = "> ";

/// Blocking read/dispatch loop. Exactly one dispatch per line; the `exit`
/// literal and end of input both terminate without dispatching.
pub async fn run_session<R, N>(mut input: R, dispatcher: &Dispatcher<N>) -> io::Result<()>
where
    R: BufRead,
    N: NodeApi,
{
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // End of input stream.
            return Ok(());
        }
        if line.trim().to_lowercase() == EXIT_COMMAND {
            return Ok(());
        }
        println!("{}", dispatcher.handle(&line).await);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::dispatch::tests::MockNode;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_exit_terminates_without_dispatch() {
        let dispatcher = Dispatcher::new(MockNode::new());
        run_session(Cursor::new("exit\n"), &dispatcher).await.unwrap();
        assert_eq!(dispatcher.node.call_count(), 0);
    }

    #[tokio::test]
    async fn test_end_of_input_terminates() {
        let dispatcher = Dispatcher::new(MockNode::new());
        run_session(Cursor::new(""), &dispatcher).await.unwrap();
        assert_eq!(dispatcher.node.call_count(), 0);
    }

    #[tokio::test]
    async fn test_each_line_dispatches_once_until_exit() {
        let dispatcher = Dispatcher::new(MockNode::new());
        let input = Cursor::new("getpeers\ngetnodeid\nexit\ngetaccounts\n");
        run_session(input, &dispatcher).await.unwrap();
        let calls = dispatcher.node.calls.lock().unwrap();
        assert_eq!(*calls, vec!["getPeers".to_string(), "getNodeId".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_command_does_not_end_session() {
        let dispatcher = Dispatcher::new(MockNode::new());
        let input = Cursor::new("bogus\ngetbalance\ngetnodeid\n");
        run_session(input, &dispatcher).await.unwrap();
        // The two bad lines are contained; the good one still runs.
        let calls = dispatcher.node.calls.lock().unwrap();
        assert_eq!(*calls, vec!["getNodeId".to_string()]);
    }
}
