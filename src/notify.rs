//! User facing notices (alerts) raised by the coordinators
use log::info;
use std::cell::RefCell;
use std::fmt;

/// A short alert shown to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    title: String,
    message: String,
}

impl Notice {
    pub fn new(title: &str, message: &str) -> Self {
        Notice {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn missing_route_fields() -> Self {
        Notice::new("Missing Information", "Please enter both origin and destination.")
    }

    pub fn no_route() -> Self {
        Notice::new("No Route", "Could not find a route")
    }

    pub fn route_failed() -> Self {
        Notice::new("Error", "Failed to fetch route.")
    }

    pub fn location_denied() -> Self {
        Notice::new(
            "Permission denied",
            "Location permission is needed to show your position on the map.",
        )
    }

    pub fn capture_permissions_required() -> Self {
        Notice::new(
            "Permissions required",
            "Camera and location permissions are required to use this feature.",
        )
    }

    pub fn capture_failed() -> Self {
        Notice::new("Error", "Could not capture image or location.")
    }

    pub fn upload_failed() -> Self {
        Notice::new("Upload Failed", "Could not send image to the server.")
    }

    pub fn upload_succeeded() -> Self {
        Notice::new("Upload Successful", "Image sent to backend.")
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Surface that presents notices to the user
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Print notices on the terminal
#[derive(Debug, Default)]
pub struct TerminalNotifier {}

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        info!("notice raised: {}", notice);
        println!("[{}] {}", notice.title(), notice.message());
    }
}

/// Keep notices in memory until the presenting layer drains them
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of every notice raised so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Remove and return all pending notices
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
