use std::io::{self, Write};

use monitor_core::{ResultRecord, SessionState, SessionView};

/// Prints only what changed since the previous render.
pub(crate) struct Renderer<W: Write> {
    out: W,
    logs_shown: usize,
    results_shown: usize,
    last_state: Option<SessionState>,
}

impl<W: Write> Renderer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            logs_shown: 0,
            results_shown: 0,
            last_state: None,
        }
    }

    pub(crate) fn render(&mut self, view: &SessionView) -> io::Result<()> {
        // A shorter buffer means the session was rebound.
        if view.logs.len() < self.logs_shown || view.results.len() < self.results_shown {
            self.logs_shown = 0;
            self.results_shown = 0;
        }

        if self.last_state != Some(view.state) {
            writeln!(self.out, "-- status: {}", view.state)?;
            self.last_state = Some(view.state);
        }
        for entry in &view.logs[self.logs_shown..] {
            writeln!(self.out, "[{}] {}", entry.level, entry.message)?;
        }
        self.logs_shown = view.logs.len();

        for record in &view.results[self.results_shown..] {
            writeln!(self.out, "{}", format_record(record))?;
        }
        self.results_shown = view.results.len();

        self.out.flush()
    }

    pub(crate) fn finish(&mut self, view: &SessionView) -> io::Result<()> {
        self.render(view)?;
        if let Some(error) = &view.error {
            writeln!(self.out, "!! {error}")?;
        }
        writeln!(self.out, "-- {} contact(s) found", view.results.len())?;
        self.out.flush()
    }
}

fn format_record(record: &ResultRecord) -> String {
    let website = record
        .website
        .as_deref()
        .map(strip_scheme)
        .unwrap_or("-");
    format!(
        "+ {} | {} | {} | {}",
        record.name,
        website,
        record.email.as_deref().unwrap_or("-"),
        record.phone.as_deref().unwrap_or("-")
    )
}

fn strip_scheme(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest.strip_prefix("www.").unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use monitor_core::{LogEntry, LogLevel};

    use super::*;

    fn rendered(renderer: &Renderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.out.clone()).unwrap()
    }

    #[test]
    fn renders_only_new_entries() {
        let mut renderer = Renderer::new(Vec::new());
        let mut view = SessionView {
            state: SessionState::Streaming,
            ..SessionView::default()
        };
        view.logs.push(LogEntry {
            level: LogLevel::Info,
            message: "start".to_string(),
        });
        renderer.render(&view).unwrap();

        view.logs.push(LogEntry {
            level: LogLevel::Other("DEBUG".to_string()),
            message: "more".to_string(),
        });
        view.results.push(ResultRecord {
            name: "Acme".to_string(),
            website: Some("https://www.acme.fr".to_string()),
            email: Some("a@x.com".to_string()),
            phone: None,
        });
        renderer.render(&view).unwrap();

        assert_eq!(
            rendered(&renderer),
            "-- status: streaming\n[INFO] start\n[DEBUG] more\n+ Acme | acme.fr | a@x.com | -\n"
        );
    }

    #[test]
    fn finish_reports_error_and_count() {
        let mut renderer = Renderer::new(Vec::new());
        let view = SessionView {
            state: SessionState::Errored,
            error: Some("connection lost".to_string()),
            ..SessionView::default()
        };

        renderer.finish(&view).unwrap();

        assert_eq!(
            rendered(&renderer),
            "-- status: error\n!! connection lost\n-- 0 contact(s) found\n"
        );
    }
}
