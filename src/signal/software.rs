//! Triggers that do not come from GPIO pins.

use super::{Button, SignalError};
use crate::booth::BoothHandle;
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

/// Routes SIGINT/SIGTERM to a quit request.
pub fn install_interrupt_handler(handle: BoothHandle) -> Result<(), SignalError> {
    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received");
        handle.exit();
    })?;
    Ok(())
}

/// Maps a console line to a button.
pub fn parse_command(line: &str) -> Option<Button> {
    match line.trim().to_ascii_lowercase().as_str() {
        "c" | "capture" => Some(Button::Capture),
        "q" | "quit" | "exit" => Some(Button::Quit),
        _ => None,
    }
}

/// Reads commands from stdin on a background thread.
///
/// Stops at end of input or after forwarding a quit.
pub fn spawn_console_trigger(handle: BoothHandle) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console-trigger".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(button) => {
                        handle.signal(button);
                        if button == Button::Quit {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => tracing::warn!(input = %line.trim(), "Unknown console command"),
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("c"), Some(Button::Capture));
        assert_eq!(parse_command("  CAPTURE \n"), Some(Button::Capture));
        assert_eq!(parse_command("q"), Some(Button::Quit));
        assert_eq!(parse_command("exit"), Some(Button::Quit));
        assert_eq!(parse_command("print"), None);
        assert_eq!(parse_command(""), None);
    }
}
