//! Line commands accepted by the terminal session.

use std::path::PathBuf;

/// Help text printed by `help`.
pub const HELP: &str = "\
Commands:
  upload <path>                 upload a photo of a clothing item
  edit <outfit> <instruction>   refine an outfit image, e.g. edit night-out add a gold necklace
  show                          print the current outfits
  wait                          wait for pending generations and edits
  reset                         start over with a different item
  help                          show this help
  quit                          wait for pending work and exit";

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload a new photo.
    Upload(PathBuf),
    /// Edit an outfit.
    Edit {
        /// Outfit id as typed; resolved loosely against the session.
        outfit: String,
        /// Free-text instruction.
        instruction: String,
    },
    /// Print the current view.
    Show,
    /// Wait until nothing is in flight.
    Wait,
    /// Start over.
    Reset,
    /// Print help.
    Help,
    /// Exit after pending work finishes.
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns a usage message for unknown commands or missing arguments.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_ascii_lowercase().as_str() {
        "upload" => {
            if rest.is_empty() {
                return Err("Usage: upload <path>".into());
            }
            Command::Upload(PathBuf::from(unquote(rest)))
        }
        "edit" => {
            let (outfit, instruction) = split_outfit(rest)
                .ok_or_else(|| "Usage: edit <outfit> <instruction>".to_string())?;
            Command::Edit { outfit, instruction }
        }
        "show" => Command::Show,
        "wait" => Command::Wait,
        "reset" | "restart" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for commands.")),
    };
    Ok(Some(command))
}

/// Split `"Night Out" add heels` or `casual add heels` into outfit and instruction.
fn split_outfit(rest: &str) -> Option<(String, String)> {
    let (outfit, instruction) = if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        (&quoted[..end], &quoted[end + 1..])
    } else {
        rest.split_once(char::is_whitespace)?
    };
    let (outfit, instruction) = (outfit.trim(), instruction.trim());
    if outfit.is_empty() || instruction.is_empty() {
        return None;
    }
    Some((outfit.to_string(), instruction.to_string()))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s)
}
