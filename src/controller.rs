//! Line prompts around a typing session: who is typing, whether to go again,
//! and the final speed summary.

use std::io::{self, BufRead, Write};

use crate::session::Score;

pub fn prompt_name<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<String> {
    writeln!(output, "Hello!")?;
    write!(output, "Enter your name: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(strip_line_ending(&line).to_string())
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Ask whether to run another session. Anything but `affirmative`
/// (case-insensitive), including end of input, means no.
pub fn ask_continue<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    affirmative: &str,
) -> io::Result<bool> {
    writeln!(output, "Again? ({}/no)", affirmative)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(line.trim().to_lowercase() == affirmative.to_lowercase())
}

pub fn print_summary<W: Write>(output: &mut W, score: &Score) -> io::Result<()> {
    writeln!(
        output,
        "\nYour speed: {:.2} CPM / {:.2} CPS",
        score.chars_per_minute, score.chars_per_second
    )?;
    output.flush()
}
