use inquire::{InquireError, Text};
use weatherbot_core::ChatPipeline;

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Read a message, answer it, repeat. Turns never end the session; only
/// an exit word, Esc or Ctrl-C does.
pub async fn run(pipeline: &ChatPipeline) -> anyhow::Result<()> {
    println!("Ask me about the weather in any city. Type `exit` to leave.");

    loop {
        let line = match Text::new("you:").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let reply = pipeline.respond(line).await;
        println!("bot: {reply}");
    }

    println!("Bye!");
    Ok(())
}

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}
