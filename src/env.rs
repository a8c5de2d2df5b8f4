// Detects whether a browser can be opened for the console

use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the --headless flag
static FORCE_HEADLESS: AtomicBool = AtomicBool::new(false);

pub fn set_headless_override(headless: bool) {
    FORCE_HEADLESS.store(headless, Ordering::Relaxed);
}

/// Whether opening a browser is pointless here
///
/// True when --headless was given, inside an SSH session or CI, with a
/// dumb terminal, or (outside macOS) without an X11 display.
pub fn is_headless_environment() -> bool {
    if FORCE_HEADLESS.load(Ordering::Relaxed) {
        tracing::debug!("Headless mode: forced by --headless flag");
        return true;
    }

    for var in ["SSH_TTY", "SSH_CONNECTION", "CI"] {
        if std::env::var_os(var).is_some() {
            tracing::debug!("Headless detected: {} set", var);
            return true;
        }
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" || term.is_empty() {
            tracing::debug!("Headless detected: TERM is '{}'", term);
            return true;
        }
    }

    // macOS has no DISPLAY
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        if std::env::var_os("DISPLAY").is_none() && std::env::var_os("WAYLAND_DISPLAY").is_none() {
            tracing::debug!("Headless detected: no DISPLAY or WAYLAND_DISPLAY");
            return true;
        }
    }

    false
}
