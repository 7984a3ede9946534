//! Turns successive session snapshots into terminal lines.

use clipdesk_models::{Clip, LogEntry};
use clipdesk_session::SessionSnapshot;

/// Remembers what has been printed so each snapshot only adds new lines.
#[derive(Debug, Default)]
pub struct Printer {
    last_log: Option<LogEntry>,
    clips_seen: usize,
    last_progress: Option<(u32, Option<String>)>,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&mut self, snapshot: &SessionSnapshot) {
        for line in self.lines(snapshot) {
            println!("{}", line);
        }
    }

    pub fn lines(&mut self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        for entry in self.unseen_log(&snapshot.log) {
            lines.push(format!("{} {}", entry.time_label(), entry.text));
        }
        self.last_log = snapshot.log.last().cloned();

        if snapshot.clips.len() < self.clips_seen {
            self.clips_seen = 0;
        }
        for clip in &snapshot.clips[self.clips_seen..] {
            lines.push(clip_line(clip));
        }
        self.clips_seen = snapshot.clips.len();

        if snapshot.job.is_active() {
            let progress = (
                snapshot.progress.percent.clamp(0.0, 100.0).round() as u32,
                snapshot.progress.status_text.clone(),
            );
            if self.last_progress.as_ref() != Some(&progress) {
                lines.push(match &progress.1 {
                    Some(text) => format!("[{:>3}%] {}", progress.0, text),
                    None => format!("[{:>3}%]", progress.0),
                });
                self.last_progress = Some(progress);
            }
        }

        lines
    }

    fn unseen_log<'a>(&self, log: &'a [LogEntry]) -> &'a [LogEntry] {
        match &self.last_log {
            Some(last) => match log.iter().rposition(|entry| entry == last) {
                Some(index) => &log[index + 1..],
                None => log,
            },
            None => log,
        }
    }
}

fn clip_line(clip: &Clip) -> String {
    match clip.viral_score {
        Some(score) => format!("clip: {} ({:.0}) {}", clip.display_name, score, clip.file_path),
        None => format!("clip: {} {}", clip.display_name, clip.file_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdesk_models::JobState;
    use clipdesk_session::ProgressView;

    fn processing() -> SessionSnapshot {
        SessionSnapshot {
            job: JobState::processing_started(),
            ..Default::default()
        }
    }

    #[test]
    fn test_only_new_log_lines_are_printed() {
        let mut printer = Printer::new();
        let mut snapshot = processing();
        snapshot.log.push(LogEntry::new("Downloading", None));
        let first = printer.lines(&snapshot);
        assert!(first[0].ends_with("Downloading"));

        snapshot.log.push(LogEntry::new("Transcribing", None));
        let second = printer.lines(&snapshot);
        assert_eq!(second.len(), 1);
        assert!(second[0].ends_with("Transcribing"));
    }

    #[test]
    fn test_cleared_log_starts_over() {
        let mut printer = Printer::new();
        let mut snapshot = processing();
        snapshot.log.push(LogEntry::new("old job", None));
        printer.lines(&snapshot);

        snapshot.log = vec![LogEntry::new("new job", None)];
        let lines = printer.lines(&snapshot);
        assert!(lines[0].ends_with("new job"));
    }

    #[test]
    fn test_progress_printed_on_change_only() {
        let mut printer = Printer::new();
        let mut snapshot = processing();
        snapshot.progress = ProgressView {
            percent: 40.0,
            phase: None,
            status_text: Some("Scoring".into()),
        };
        assert_eq!(printer.lines(&snapshot), ["[ 40%] Scoring"]);
        assert!(printer.lines(&snapshot).is_empty());

        snapshot.progress.percent = 41.0;
        assert_eq!(printer.lines(&snapshot), ["[ 41%] Scoring"]);
    }

    #[test]
    fn test_clips_are_printed_once() {
        let mut printer = Printer::new();
        let mut snapshot = SessionSnapshot {
            job: JobState::Succeeded,
            ..Default::default()
        };
        let mut clip = Clip::new("Hook", "/out/clip_1.mp4");
        clip.viral_score = Some(87.0);
        snapshot.clips.push(clip);

        assert_eq!(printer.lines(&snapshot), ["clip: Hook (87) /out/clip_1.mp4"]);
        assert!(printer.lines(&snapshot).is_empty());
    }
}
