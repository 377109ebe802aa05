use std::fmt;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::messages::MsgCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// Short-lived user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
    pub category: MsgCategory,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            ToastVariant::Default => write!(f, "{}: {}", self.title, self.description),
            ToastVariant::Destructive => write!(f, "[!] {}: {}", self.title, self.description),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => info!(category = %toast.category, "{}", toast),
            ToastVariant::Destructive => warn!(category = %toast.category, "{}", toast),
        }
    }
}

/// Forwards notifications to whoever owns the receiving half.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Toast>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, toast: Toast) {
        // The receiver is gone once the front-end shuts down; nothing left to show.
        let _ = self.sender.send(toast);
    }
}

/// Prints notifications until every sender is dropped.
pub async fn print_task(mut receiver: mpsc::UnboundedReceiver<Toast>) {
    while let Some(toast) = receiver.recv().await {
        match toast.variant {
            ToastVariant::Default => println!("{toast}"),
            ToastVariant::Destructive => eprintln!("{toast}"),
        }
    }
}
