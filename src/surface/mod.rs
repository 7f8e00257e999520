//! Collaborator surfaces consumed by the gateway
//!
//! Identity, notifications and message rendering are plumbing around the
//! orchestration core. The gateway depends only on these narrow traits;
//! the terminal implementations here are deliberately minimal.

/// Profile of a signed-in user
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// Name shown in the UI
    pub display_name: String,
    /// Account email, when known
    pub email: Option<String>,
}

/// Current signed-in identity, or none
pub trait Identity: Send + Sync {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<UserProfile>;
}

/// Identity backed by static configuration
///
/// Stands in for the document-store user service the full product uses.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    profile: Option<UserProfile>,
}

impl LocalIdentity {
    /// Create an identity from an optional display name
    #[must_use]
    pub fn new(display_name: Option<String>) -> Self {
        Self {
            profile: display_name.map(|display_name| UserProfile {
                display_name,
                email: None,
            }),
        }
    }
}

impl Identity for LocalIdentity {
    fn current_user(&self) -> Option<UserProfile> {
        self.profile.clone()
    }
}

/// Transient user-facing notifications
///
/// Lightweight warnings (for example "nothing to regenerate") surface here
/// rather than in the conversation transcript.
pub trait Notifier: Send + Sync {
    /// Show a transient notification
    fn notify(&self, title: &str, body: &str);
}

/// Notifier that prints to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, body: &str) {
        eprintln!("[{title}] {body}");
    }
}
