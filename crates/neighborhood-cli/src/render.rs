//! Plain-text rendering of entities and notices.

use neighborhood_core::models::{Announcement, Feedback, Report, Resident, ScheduleEntry};
use neighborhood_core::store::{Notice, NoticeLevel, Notifier};
use neighborhood_core::utils::{format_date, format_phone, truncate_string};

/// Width of the title column in list output
const TITLE_WIDTH: usize = 40;

/// One-line and detailed text for an entity.
pub trait Describe {
    fn row(&self) -> String;
    fn details(&self) -> Vec<(&'static str, String)>;
}

impl Describe for Resident {
    fn row(&self) -> String {
        format!(
            "#{:<3} {:<24} {:<28} {:<15} {}",
            self.id,
            truncate_string(&self.name, 24),
            truncate_string(&self.address, 28),
            format_phone(&self.phone),
            self.status
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Address", self.address.clone()),
            ("Phone", format_phone(&self.phone)),
            ("Email", self.email.clone()),
            ("Status", self.status.to_string()),
        ]
    }
}

impl Describe for ScheduleEntry {
    fn row(&self) -> String {
        format!(
            "#{:<3} {:<12} {:<6} {:<14} {:<20} {}",
            self.id,
            format_date(self.date),
            self.shift,
            self.time,
            truncate_string(&self.name, 20),
            self.status
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Guard", self.name.clone()),
            ("Shift", self.shift.to_string()),
            ("Date", format_date(self.date)),
            ("Time", self.time.clone()),
            ("Status", self.status.to_string()),
        ]
    }
}

impl Describe for Announcement {
    fn row(&self) -> String {
        format!(
            "#{:<3} {} {:<width$} {} ({})",
            self.id,
            self.priority.icon(),
            truncate_string(&self.title, TITLE_WIDTH),
            format_date(self.date),
            self.author,
            width = TITLE_WIDTH
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Priority", self.priority.to_string()),
            ("Author", self.author.clone()),
            ("Date", format_date(self.date)),
            ("Content", self.content.clone()),
        ]
    }
}

impl Describe for Feedback {
    fn row(&self) -> String {
        let replied = if self.reply.is_some() { "replied" } else { "" };
        format!(
            "#{:<3} {} {:<width$} {} {}",
            self.id,
            self.stars(),
            truncate_string(&self.title, TITLE_WIDTH),
            self.author,
            replied,
            width = TITLE_WIDTH
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Author", self.author.clone()),
            ("Date", format_date(self.date)),
            ("Rating", self.stars()),
            ("Content", self.content.clone()),
            ("Reply", self.reply.clone().unwrap_or_else(|| "-".to_string())),
        ]
    }
}

impl Describe for Report {
    fn row(&self) -> String {
        format!(
            "#{:<3} {:<width$} {} ({})",
            self.id,
            truncate_string(&self.title, TITLE_WIDTH),
            format_date(self.date),
            self.author,
            width = TITLE_WIDTH
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Incident", self.title.clone()),
            ("Author", self.author.clone()),
            ("Date", format_date(self.date)),
            ("Details", self.content.clone()),
        ]
    }
}

pub fn print_details(details: &[(&'static str, String)]) {
    let width = details.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in details {
        println!("{:>width$}: {}", label, value, width = width);
    }
}

/// Prints notices as they arrive: successes to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}: {}", notice.title, notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neighborhood_core::models::seed;

    #[test]
    fn test_resident_row_formats_phone() {
        let resident = &seed::residents()[0];
        let row = resident.row();
        assert!(row.starts_with("#1"));
        assert!(row.contains(&format_phone(&resident.phone)));
    }

    #[test]
    fn test_feedback_details_show_missing_reply() {
        let mut feedback = seed::feedback()[0].clone();
        feedback.reply = None;
        let details = feedback.details();
        assert_eq!(details.last().unwrap(), &("Reply", "-".to_string()));
    }
}
