use anyhow::Result;
use log::info;

use crate::alarm::scheduler::AlarmFireEvent;

pub const NOTIFICATION_TITLE: &str = "Time to Eat! <3";

pub fn notification_body(event: &AlarmFireEvent) -> String {
    format!("It's time for {}!", event.label)
}

pub trait Notifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<()>;
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<()> {
        info!("notification: {title} - {body}");
        Ok(())
    }
}
