//! Interactive query shell
//!
//! Reads one query per line, routes it, prints the route and the answer.
//! `exit` (any case, surrounding whitespace ignored) or end of input ends the
//! session. An orchestration error ends it too and is returned to the caller.

use crate::agents::{Orchestrator, RouteResult};
use crate::config::TraceBackend;
use crate::error::RouterResult;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub const PROMPT: &str = "Enter your query: ";
const RULE: &str = "------------------------------------";

/// Whether an input line ends the session
pub fn is_exit_command(line: &str) -> bool {
    line.trim().to_lowercase() == "exit"
}

/// Greeting printed when the shell starts
pub fn banner(backend: TraceBackend) -> String {
    match backend.display_name() {
        Some(name) => format!("\n{name} Multi-Agent Demo (type 'exit' to quit)\n"),
        None => "\nMulti-Agent Demo (type 'exit' to quit)\n".to_string(),
    }
}

/// Output block for one routed query
pub fn format_result(result: &RouteResult) -> String {
    format!(
        "\n{RULE}\nROUTE: {}\nANSWER: {}\n{RULE}\n",
        result.route, result.answer
    )
}

/// Read-route-print loop over any async line source
pub struct Shell<'a> {
    orchestrator: &'a Orchestrator,
}

impl<'a> Shell<'a> {
    pub fn new(orchestrator: &'a Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Run until `exit`, end of input or the first orchestration error
    ///
    /// Returns the number of queries answered.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> RouterResult<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut answered = 0;

        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                debug!("End of input, leaving shell");
                break;
            };

            if is_exit_command(&line) {
                break;
            }

            let result = self.orchestrator.orchestrate(&line).await?;
            writer.write_all(format_result(&result).as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            answered += 1;
        }

        Ok(answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Category;

    #[test]
    fn test_exit_command_matching() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  EXIT \n"));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_banner_names_hosted_backends() {
        assert_eq!(
            banner(TraceBackend::LangSmith),
            "\nLangSmith Multi-Agent Demo (type 'exit' to quit)\n"
        );
        assert_eq!(
            banner(TraceBackend::Langfuse),
            "\nLangfuse Multi-Agent Demo (type 'exit' to quit)\n"
        );
        assert_eq!(
            banner(TraceBackend::Log),
            "\nMulti-Agent Demo (type 'exit' to quit)\n"
        );
    }

    #[test]
    fn test_format_result_block() {
        let block = format_result(&RouteResult {
            route: Category::Hr,
            answer: "Fifteen days.".to_string(),
        });

        assert_eq!(
            block,
            "\n------------------------------------\nROUTE: hr\nANSWER: Fifteen days.\n------------------------------------\n"
        );
    }
}
