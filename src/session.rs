//! Session actions
//!
//! Maps each dialog button to the system command it runs and executes
//! that command. Failures are logged and never stop the dialog from
//! closing.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

/// One of the five dialog buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionAction {
    Cancel,
    Lock,
    Logout,
    Reboot,
    Shutdown,
}

impl SessionAction {
    /// Display order, left to right
    pub const ALL: [SessionAction; 5] = [
        SessionAction::Cancel,
        SessionAction::Lock,
        SessionAction::Logout,
        SessionAction::Reboot,
        SessionAction::Shutdown,
    ];

    /// File name stem of the action's icons
    pub fn icon_stem(self) -> &'static str {
        match self {
            SessionAction::Cancel => "cancel",
            SessionAction::Lock => "lock",
            SessionAction::Logout => "logout",
            SessionAction::Reboot => "reboot",
            SessionAction::Shutdown => "shutdown",
        }
    }

    /// Command to run, or `None` when the action only closes the dialog
    pub fn invocation(self, ctx: &SessionContext) -> Option<Invocation> {
        match self {
            SessionAction::Cancel => None,
            SessionAction::Lock => Some(match &ctx.lock_wallpaper {
                Some(wallpaper) => Invocation::new(
                    "i3lock",
                    ["-i".to_string(), wallpaper.display().to_string()],
                ),
                None => Invocation::new("i3lock", Vec::<String>::new()),
            }),
            SessionAction::Logout => Some(Invocation::new(
                "loginctl",
                ["terminate-user".to_string(), ctx.uid.to_string()],
            )),
            SessionAction::Reboot => Some(Invocation::new("systemctl", ["reboot"])),
            SessionAction::Shutdown => Some(Invocation::new("systemctl", ["poweroff"])),
        }
    }

    /// Log line emitted when the button fires
    pub fn announce(self) {
        match self {
            SessionAction::Cancel => info!("Cancel pressed -> closing UI"),
            SessionAction::Lock => info!("Lock pressed -> launching i3lock"),
            SessionAction::Logout => info!("Logout pressed -> terminating user session"),
            SessionAction::Reboot => info!("Reboot pressed -> calling systemctl reboot"),
            SessionAction::Shutdown => info!("Shutdown pressed -> calling systemctl poweroff"),
        }
    }
}

/// Facts about the running session the commands depend on
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub uid: u32,
    /// Set only if the wallpaper file exists
    pub lock_wallpaper: Option<PathBuf>,
}

impl SessionContext {
    /// Capture the current user and check for the lock wallpaper
    pub fn current(lock_wallpaper: &Path) -> Self {
        // SAFETY: getuid has no preconditions and cannot fail
        let uid = unsafe { libc::getuid() };
        Self::new(uid, lock_wallpaper)
    }

    pub fn new(uid: u32, lock_wallpaper: &Path) -> Self {
        Self {
            uid,
            lock_wallpaper: lock_wallpaper
                .is_file()
                .then(|| lock_wallpaper.to_path_buf()),
        }
    }
}

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("command `{invocation}` failed ({code:?}): {stderr}")]
    Failed {
        invocation: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Run `invocation` to completion, capturing its output
pub async fn execute(invocation: &Invocation) -> Result<(), LaunchError> {
    let output = Command::new(&invocation.program)
        .args(&invocation.args)
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound(invocation.program.clone()),
            _ => LaunchError::Spawn {
                program: invocation.program.clone(),
                source: e,
            },
        })?;

    if output.status.success() {
        return Ok(());
    }

    Err(LaunchError::Failed {
        invocation: invocation.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Run `invocation` and log the outcome
pub async fn run_logged(invocation: Invocation) {
    match execute(&invocation).await {
        Ok(()) => info!("`{}` completed", invocation),
        Err(e @ LaunchError::Spawn { .. }) => error!("{}", e),
        Err(e) => warn!("{}", e),
    }
}
