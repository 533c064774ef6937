use std::collections::HashMap;
use std::fmt;
use std::process::Child;

use super::{ProcessError, Termination};

/// A background child that has not been reaped yet.
#[derive(Debug)]
pub struct BackgroundJob {
    child: Child,
    command: String,
}

impl BackgroundJob {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// A background job observed to have finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub pid: u32,
    pub termination: Termination,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background pid {} is done: {}", self.pid, self.termination)
    }
}

/// Outstanding background work, keyed by pid.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: HashMap<u32, BackgroundJob>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, child: Child, command: impl Into<String>) -> u32 {
        let pid = child.id();
        let command = command.into();
        tracing::debug!(pid, %command, "tracking background job");
        self.jobs.insert(pid, BackgroundJob { child, command });
        pid
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.jobs.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &BackgroundJob> {
        self.jobs.values()
    }

    /// Checks every job without blocking and removes the ones that have
    /// already terminated.
    pub fn reap_finished(&mut self) -> Result<Vec<Completion>, ProcessError> {
        let mut finished = Vec::new();
        for (&pid, job) in self.jobs.iter_mut() {
            match job.child.try_wait() {
                Ok(Some(status)) => finished.push(Completion {
                    pid,
                    termination: status.into(),
                }),
                Ok(None) => {}
                Err(source) => return Err(ProcessError::Reap { pid, source }),
            }
        }

        for completion in &finished {
            self.jobs.remove(&completion.pid);
            tracing::debug!(pid = completion.pid, status = %completion.termination, "reaped");
        }
        Ok(finished)
    }

    /// Sends SIGTERM to every job and forgets them. Does not wait.
    pub fn terminate_all(&mut self) -> usize {
        let count = self.jobs.len();
        for (pid, job) in self.jobs.drain() {
            let Ok(raw) = libc::pid_t::try_from(pid) else {
                continue;
            };
            // SAFETY: kill(2) on a pid we spawned and have not reaped, so it
            // cannot have been recycled.
            if unsafe { libc::kill(raw, libc::SIGTERM) } == -1 {
                tracing::warn!(
                    pid,
                    command = job.command(),
                    error = %std::io::Error::last_os_error(),
                    "failed to terminate background job"
                );
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    fn spawn(program: &str, args: &[&str]) -> Child {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .unwrap()
    }

    fn reap_until(registry: &mut JobRegistry, pid: u32) -> Completion {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let done = registry.reap_finished().unwrap();
            if let Some(completion) = done.into_iter().find(|c| c.pid == pid) {
                return completion;
            }
            assert!(Instant::now() < deadline, "pid {} never finished", pid);
            thread::sleep(Duration::from_millis(20));
        }
    }

    fn wait_raw(pid: u32) -> libc::c_int {
        let mut status = 0;
        let result = unsafe { libc::waitpid(pid as libc::pid_t, &mut status, 0) };
        assert_eq!(result, pid as libc::pid_t);
        status
    }

    #[test]
    fn test_reap_reports_exit_value() {
        let mut registry = JobRegistry::new();
        let pid = registry.insert(spawn("sh", &["-c", "exit 4"]), "sh -c exit 4");
        assert!(registry.contains(pid));

        let completion = reap_until(&mut registry, pid);
        assert_eq!(completion.termination, Termination::Exited(4));
        assert_eq!(
            completion.to_string(),
            format!("background pid {} is done: exit value 4", pid)
        );
        assert!(!registry.contains(pid));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reap_reports_signal() {
        let mut registry = JobRegistry::new();
        let pid = registry.insert(spawn("sleep", &["30"]), "sleep 30");
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGKILL);
        }

        let completion = reap_until(&mut registry, pid);
        assert_eq!(completion.termination, Termination::Signaled(libc::SIGKILL));
        assert_eq!(
            completion.to_string(),
            format!("background pid {} is done: terminated by signal 9", pid)
        );
    }

    #[test]
    fn test_running_job_is_not_reported() {
        let mut registry = JobRegistry::new();
        let slow = registry.insert(spawn("sleep", &["30"]), "sleep 30");
        let fast = registry.insert(spawn("true", &[]), "true");

        reap_until(&mut registry, fast);
        assert!(registry.contains(slow));
        assert_eq!(registry.len(), 1);
        assert!(registry.reap_finished().unwrap().is_empty());

        assert_eq!(registry.terminate_all(), 1);
        let status = wait_raw(slow);
        assert!(libc::WIFSIGNALED(status));
        assert_eq!(libc::WTERMSIG(status), libc::SIGTERM);
    }

    #[test]
    fn test_terminate_all_signals_every_job() {
        let mut registry = JobRegistry::new();
        let first = registry.insert(spawn("sleep", &["30"]), "sleep 30");
        let second = registry.insert(spawn("sleep", &["30"]), "sleep 30");
        let commands: Vec<&str> = registry.jobs().map(BackgroundJob::command).collect();
        assert_eq!(commands, vec!["sleep 30", "sleep 30"]);

        assert_eq!(registry.terminate_all(), 2);
        assert!(registry.is_empty());

        for pid in [first, second] {
            let status = wait_raw(pid);
            assert!(libc::WIFSIGNALED(status));
            assert_eq!(libc::WTERMSIG(status), libc::SIGTERM);
        }
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = JobRegistry::new();
        assert!(registry.reap_finished().unwrap().is_empty());
        assert_eq!(registry.terminate_all(), 0);
    }
}
