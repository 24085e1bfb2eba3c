use anyhow::Result;
use std::fmt::Write;

use crate::resolver::ReplacementMemo;

/// Renders the learned answers as table entries ready to paste into
/// `BUILTIN_REPLACEMENTS`, followed by the matching `--replace` flags.
///
/// Each entry maps the word to the word with every placeholder replaced.
pub fn render_summary(memo: &ReplacementMemo, placeholder: char) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "User-provided replacements:")?;
    writeln!(output, "pub const BUILTIN_REPLACEMENTS: &[(&str, &str)] = &[")?;
    for (word, answer) in memo.iter() {
        let replaced = word.replace(placeholder, answer);
        writeln!(output, "    ({:?}, {:?}),", word, replaced)?;
    }
    writeln!(output, "];")?;

    if !memo.is_empty() {
        writeln!(output)?;
        writeln!(output, "Or pass them on the command line:")?;
        for (word, answer) in memo.iter() {
            let replaced = word.replace(placeholder, answer);
            writeln!(output, "  --replace {:?}", format!("{}={}", word, replaced))?;
        }
    }

    writeln!(output)?;
    write!(
        output,
        "You can add these entries to the built-in replacement table for future use."
    )?;

    Ok(output)
}
