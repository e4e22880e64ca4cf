use clap::ValueEnum;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use movie_search_core::WatchedSummary;
use movie_search_models::{MovieDetails, MovieSummary, WatchedEntry};
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(text: &str) -> Cell {
    Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

fn one_decimal(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        if self.is_human() {
            println!("{} {}", "✓".green(), msg.as_ref());
        } else {
            self.print_json(&json!({ "type": "success", "message": msg.as_ref() }));
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        if self.is_human() {
            eprintln!("{} {}", "✗".red(), msg.as_ref());
        } else {
            self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        if self.is_human() {
            println!("{}", msg.as_ref());
        } else {
            self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        if self.is_human() {
            println!("{} {}", "⚠".yellow(), msg.as_ref());
        } else {
            self.print_json(&json!({ "type": "warning", "message": msg.as_ref() }));
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && !self.is_human() {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default())
            }
            OutputFormat::Human => println!("{}", data),
        }
    }

    /// Search results, numbered so they can be picked by position
    pub fn movies(&self, movies: &[MovieSummary]) {
        if !self.is_human() {
            self.json(&json!({ "type": "search", "results": movies }));
            return;
        }
        if self.quiet {
            return;
        }
        let mut table = styled_table();
        table.set_header(vec![header("#"), header("Title"), header("Year"), header("IMDb ID")]);
        for (i, movie) in movies.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&movie.title),
                Cell::new(&movie.year),
                Cell::new(&movie.id).fg(Color::DarkGrey),
            ]);
        }
        println!("{}", table);
        println!("Found {} results", movies.len().to_string().bold());
    }

    pub fn details(&self, details: &MovieDetails, user_rating: Option<u8>) {
        if !self.is_human() {
            self.json(&json!({ "type": "details", "movie": details, "user_rating": user_rating }));
            return;
        }
        if self.quiet {
            return;
        }
        let mut table = styled_table();
        table.set_header(vec![header(details.display_title()), Cell::new(or_dash(details.year.as_deref()))]);
        let rows = [
            ("Released", &details.released),
            ("Runtime", &details.runtime),
            ("Genre", &details.genre),
            ("IMDb rating", &details.imdb_rating),
            ("Director", &details.director),
            ("Starring", &details.actors),
        ];
        for (label, value) in rows {
            table.add_row(vec![Cell::new(label), Cell::new(or_dash(value.as_deref()))]);
        }
        println!("{}", table);
        if let Some(plot) = details.plot.as_deref().filter(|p| !p.is_empty()) {
            println!("{}", plot.italic());
        }
        if let Some(rating) = user_rating {
            println!("You rated this movie {} ⭐", rating.to_string().yellow());
        }
    }

    pub fn watched(&self, entries: &[WatchedEntry]) {
        if !self.is_human() {
            self.json(&json!({ "type": "watched", "entries": entries }));
            return;
        }
        if self.quiet {
            return;
        }
        if entries.is_empty() {
            println!("{}", "No watched movies yet".bright_black());
            return;
        }
        let mut table = styled_table();
        table.set_header(vec![
            header("Title"),
            header("Year"),
            header("IMDb"),
            header("You"),
            header("Runtime"),
            header("IMDb ID"),
        ]);
        for entry in entries {
            table.add_row(vec![
                Cell::new(&entry.title),
                Cell::new(&entry.year),
                Cell::new(one_decimal(entry.external_rating)),
                Cell::new(entry.user_rating).fg(Color::Yellow),
                Cell::new(format!("{} min", entry.runtime_minutes)),
                Cell::new(&entry.id).fg(Color::DarkGrey),
            ]);
        }
        println!("{}", table);
    }

    pub fn summary(&self, summary: &WatchedSummary) {
        if !self.is_human() {
            self.json(&json!({ "type": "summary", "summary": summary }));
            return;
        }
        if self.quiet {
            return;
        }
        println!(
            "{}  #️⃣ {} movies  ⭐️ {}  🌟 {}  ⏳ {} min",
            "Movies you watched".bold(),
            summary.count,
            one_decimal(summary.avg_external_rating),
            one_decimal(summary.avg_user_rating),
            summary.avg_runtime_minutes.map(|m| format!("{:.0}", m)).unwrap_or_else(|| "-".to_string()),
        );
    }
}
