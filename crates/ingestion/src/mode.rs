//! Read-mode detection

use std::io::IsTerminal;

/// Whether standard input is an interactive terminal (character device)
///
/// Feeds [`contracts::TeeConfig::resolve_read_mode`]: a terminal is read line
/// by line so each line is dispatched as soon as it is entered; pipes, files
/// and redirects are read in fixed-size blocks.
pub fn stdin_is_terminal() -> bool {
    std::io::stdin().is_terminal()
}
