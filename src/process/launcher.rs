use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use libc::{c_char, c_int};

use super::{signal, ProcessError, Termination};
use crate::shell::Invocation;

/// Spawns external programs with redirection and per-child signal policy.
#[derive(Debug, Clone)]
pub struct Launcher {
    report_delay: Duration,
}

impl Launcher {
    pub fn new(report_delay: Duration) -> Self {
        Self { report_delay }
    }

    /// Pause before announcing a background pid, so a child that fails
    /// straight away gets its diagnostic out first.
    pub fn report_delay(&self) -> Duration {
        self.report_delay
    }

    /// Forks a child for `invocation`. The program is exec'd from inside the
    /// child, so a missing or unrunnable program still yields a child, which
    /// exits with status 1 after printing `<program>: <reason>`.
    pub fn spawn(&self, invocation: &Invocation, background: bool) -> Result<Child, ProcessError> {
        let exec = ChildExec::new(invocation)?;
        // argv goes to execvp in the hook; the std side never execs.
        let mut command = Command::new(&invocation.program);

        if background {
            if invocation.input.is_none() {
                command.stdin(Stdio::null());
            }
            if invocation.output.is_none() {
                command.stdout(Stdio::null());
            }
        }

        let input = invocation
            .input
            .as_deref()
            .map(ChildRedirect::input)
            .transpose()?;
        let output = invocation
            .output
            .as_deref()
            .map(ChildRedirect::output)
            .transpose()?;

        // SAFETY: the hook runs between fork and exec and only calls
        // open/dup2/close/signal/write/execvp/_exit on buffers prepared here.
        unsafe {
            command.pre_exec(move || {
                if let Some(redirect) = &input {
                    redirect.apply();
                }
                if let Some(redirect) = &output {
                    redirect.apply();
                }
                signal::reset_child_signals(background)?;
                exec.run()
            });
        }

        let child = command
            .spawn()
            .map_err(|e| classify_spawn_error(&invocation.program, e))?;
        tracing::debug!(pid = child.id(), %invocation, background, "spawned");
        Ok(child)
    }

    /// Blocks until `child` exits.
    pub fn wait(&self, mut child: Child) -> Result<Termination, ProcessError> {
        let pid = child.id();
        let status = child
            .wait()
            .map_err(|source| ProcessError::Wait { pid, source })?;
        Ok(status.into())
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Process-creation failures stop the interpreter; anything else means this
/// one command could not be set up.
fn classify_spawn_error(program: &str, error: io::Error) -> ProcessError {
    match error.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::ENOMEM) => ProcessError::Spawn(error),
        _ => ProcessError::Exec {
            program: program.to_string(),
            source: error,
        },
    }
}

fn nul_free(value: &[u8], what: &str) -> Result<CString, ProcessError> {
    CString::new(value)
        .map_err(|_| ProcessError::InvalidArgument(format!("{}: contains a nul byte", what)))
}

/// The argv handed to `execvp` in the child, built before fork.
struct ChildExec {
    program: CString,
    // Owns the strings `argv` points into.
    _args: Vec<CString>,
    argv: Vec<*const c_char>,
    prefix: Vec<u8>,
}

// SAFETY: `argv` only points into `_args`, whose heap buffers never move and
// are never mutated after construction.
unsafe impl Send for ChildExec {}
unsafe impl Sync for ChildExec {}

impl ChildExec {
    fn new(invocation: &Invocation) -> Result<Self, ProcessError> {
        let program = nul_free(invocation.program.as_bytes(), &invocation.program)?;
        let args = invocation
            .args
            .iter()
            .map(|arg| nul_free(arg.as_bytes(), arg))
            .collect::<Result<Vec<_>, _>>()?;
        let argv = args
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();

        Ok(Self {
            program,
            _args: args,
            argv,
            prefix: format!("{}: ", invocation.program).into_bytes(),
        })
    }

    /// Replaces the child image, or exits the child with status 1.
    fn run(&self) -> ! {
        // SAFETY: both pointers reference nul-terminated buffers owned by
        // self, and argv ends with a null pointer.
        unsafe {
            libc::execvp(self.program.as_ptr(), self.argv.as_ptr());
        }
        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
        signal::write_raw(libc::STDERR_FILENO, &self.prefix);
        signal::write_raw(libc::STDERR_FILENO, exec_failure_reason(errno));
        // SAFETY: terminates the forked child without running parent cleanup.
        unsafe { libc::_exit(1) }
    }
}

// Static strings: strerror may allocate, which is off limits after fork.
fn exec_failure_reason(errno: c_int) -> &'static [u8] {
    match errno {
        libc::ENOENT => b"No such file or directory\n",
        libc::EACCES => b"Permission denied\n",
        libc::ENOEXEC => b"Exec format error\n",
        libc::ENOTDIR => b"Not a directory\n",
        libc::ELOOP => b"Too many levels of symbolic links\n",
        libc::E2BIG => b"Argument list too long\n",
        libc::ENAMETOOLONG => b"File name too long\n",
        libc::ENOMEM => b"Cannot allocate memory\n",
        _ => b"cannot execute\n",
    }
}

/// A redirection opened inside the child. Everything it needs is built
/// before fork.
struct ChildRedirect {
    path: CString,
    flags: c_int,
    target: c_int,
    failure: Vec<u8>,
}

impl ChildRedirect {
    fn input(path: &Path) -> Result<Self, ProcessError> {
        Self::new(path, libc::O_RDONLY, libc::STDIN_FILENO, "input")
    }

    fn output(path: &Path) -> Result<Self, ProcessError> {
        Self::new(
            path,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            libc::STDOUT_FILENO,
            "output",
        )
    }

    fn new(path: &Path, flags: c_int, target: c_int, direction: &str) -> Result<Self, ProcessError> {
        let raw = nul_free(path.as_os_str().as_bytes(), &path.display().to_string())?;
        Ok(Self {
            path: raw,
            flags: flags | libc::O_CLOEXEC,
            target,
            failure: format!("cannot open {} for {}\n", path.display(), direction).into_bytes(),
        })
    }

    /// Opens the file onto the target descriptor, or exits the child with
    /// status 1.
    fn apply(&self) {
        // SAFETY: async-signal-safe calls only, on buffers owned by self.
        unsafe {
            let fd = libc::open(self.path.as_ptr(), self.flags, 0o644 as libc::c_uint);
            if fd == -1 {
                signal::write_raw(libc::STDERR_FILENO, &self.failure);
                libc::_exit(1);
            }
            if libc::dup2(fd, self.target) == -1 {
                signal::write_raw(libc::STDERR_FILENO, &self.failure);
                libc::_exit(1);
            }
            libc::close(fd);
        }
    }
}
