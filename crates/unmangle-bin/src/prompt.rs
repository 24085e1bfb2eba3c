use anyhow::{Context, Result};
use inquire::Text;
use std::io::{BufRead, IsTerminal, Write};

/// Asks the user what the first placeholder of `word` stands for.
///
/// Uses an inquire prompt on a terminal, which inquire draws on stderr. When
/// stdin is piped the prompt is written to stdout and answers are read line
/// by line. An empty answer is valid and removes the placeholder.
pub fn ask_replacement(placeholder: char, name: &str, word: &str) -> Result<String> {
    let message = prompt_message(placeholder, word);

    if std::io::stdin().is_terminal() {
        let answer = Text::new(&message)
            .with_help_message(&format!("in name: {}", name))
            .prompt()?;
        return Ok(answer);
    }

    ask_piped(&mut std::io::stdin().lock(), &mut std::io::stdout(), &message)
}

fn ask_piped<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, message: &str) -> Result<String> {
    write!(writer, "{} ", message)?;
    writer.flush()?;
    let answer = read_answer(reader)?;
    writeln!(writer)?;
    Ok(answer)
}

fn prompt_message(placeholder: char, word: &str) -> String {
    format!("Enter replacement character for '{}' in '{}':", placeholder, word)
}

fn read_answer<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read replacement from stdin")?;
    if read == 0 {
        anyhow::bail!("stdin closed while waiting for a replacement");
    }

    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
