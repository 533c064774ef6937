use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libc::{c_int, SIGINT, SIGTSTP, SIG_DFL, SIG_ERR, SIG_IGN};
use signal_hook::low_level;
use signal_hook::SigId;

use crate::process::ProcessError;

const ENTER_NOTICE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n: ";
const EXIT_NOTICE: &[u8] = b"\nExiting foreground-only mode\n: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    ForegroundOnly,
}

/// Foreground-only mode, flipped by SIGTSTP.
///
/// The flag is written only from the signal handler (or [`toggle`] in tests)
/// and read by the launcher when it decides whether `&` is honoured.
///
/// [`toggle`]: ModeController::toggle
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    foreground_only: Arc<AtomicBool>,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the SIGTSTP handler. The returned id can be passed to
    /// `signal_hook::low_level::unregister`.
    pub fn install(&self) -> Result<SigId, ProcessError> {
        let flag = Arc::clone(&self.foreground_only);
        // SAFETY: the handler only flips an atomic and calls write(2).
        let id = unsafe {
            low_level::register(SIGTSTP, move || {
                let mode = flip(&flag);
                announce(mode);
            })
        }
        .map_err(|e| ProcessError::SignalError(format!("SIGTSTP: {}", e)))?;

        tracing::debug!("foreground-only toggle installed on SIGTSTP");
        Ok(id)
    }

    pub fn mode(&self) -> Mode {
        if self.is_foreground_only() {
            Mode::ForegroundOnly
        } else {
            Mode::Normal
        }
    }

    pub fn is_foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }

    /// Same transition the signal handler performs, without the notice.
    pub fn toggle(&self) -> Mode {
        flip(&self.foreground_only)
    }
}

fn flip(flag: &AtomicBool) -> Mode {
    if flag.fetch_xor(true, Ordering::SeqCst) {
        Mode::Normal
    } else {
        Mode::ForegroundOnly
    }
}

// Runs in signal context: no allocation, no buffered I/O.
fn announce(mode: Mode) {
    let notice = match mode {
        Mode::ForegroundOnly => ENTER_NOTICE,
        Mode::Normal => EXIT_NOTICE,
    };
    write_raw(libc::STDOUT_FILENO, notice);
}

pub(crate) fn write_raw(fd: c_int, bytes: &[u8]) {
    // SAFETY: plain write(2) on a borrowed buffer; a short write is ignored.
    unsafe {
        libc::write(fd, bytes.as_ptr().cast(), bytes.len());
    }
}

/// The interpreter ignores SIGINT. `SIG_IGN` survives exec, so background
/// children inherit it.
pub fn ignore_interrupts() -> Result<(), ProcessError> {
    set_disposition(SIGINT, SIG_IGN)
        .map_err(|e| ProcessError::SignalError(format!("SIGINT: {}", e)))
}

/// Signal dispositions for a freshly forked child, called between fork and
/// exec.
pub(crate) fn reset_child_signals(background: bool) -> io::Result<()> {
    set_disposition(SIGTSTP, SIG_IGN)?;
    if background {
        set_disposition(SIGINT, SIG_IGN)
    } else {
        set_disposition(SIGINT, SIG_DFL)
    }
}

fn set_disposition(signal: c_int, handler: libc::sighandler_t) -> io::Result<()> {
    // SAFETY: installs SIG_IGN or SIG_DFL, never a Rust function.
    let previous = unsafe { libc::signal(signal, handler) };
    if previous == SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_starts_in_normal_mode() {
        let mode = ModeController::new();
        assert_eq!(mode.mode(), Mode::Normal);
        assert!(!mode.is_foreground_only());
    }

    #[test]
    fn test_toggle_alternates() {
        let mode = ModeController::new();
        assert_eq!(mode.toggle(), Mode::ForegroundOnly);
        assert!(mode.is_foreground_only());
        assert_eq!(mode.toggle(), Mode::Normal);
        assert!(!mode.is_foreground_only());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let mode = ModeController::new();
        let observer = mode.clone();
        mode.toggle();
        assert_eq!(observer.mode(), Mode::ForegroundOnly);
    }

    #[test]
    fn test_sigtstp_flips_mode() {
        let mode = ModeController::new();
        let id = mode.install().unwrap();

        unsafe {
            libc::kill(libc::getpid(), SIGTSTP);
        }
        let deadline = Instant::now() + Duration::from_secs(2);
        while !mode.is_foreground_only() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(mode.mode(), Mode::ForegroundOnly);

        unsafe {
            libc::kill(libc::getpid(), SIGTSTP);
        }
        let deadline = Instant::now() + Duration::from_secs(2);
        while mode.is_foreground_only() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(mode.mode(), Mode::Normal);

        assert!(low_level::unregister(id));
    }
}
