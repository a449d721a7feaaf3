use std::fs;
use std::io;
use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A titled block of HTML content and interactive plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
    plot_count: usize,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
            plot_count: 0,
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let id = format!(
            "{}-plot-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.plot_count
        );
        self.plot_count += 1;
        self.content.push(html! {
            div class="plot" { (PreEscaped(plot.to_inline_html(Some(&id)))) }
        });
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    (block)
                }
            }
        }
    }
}

/// Self-contained HTML report. Plots load plotly.js from the CDN.
pub struct Report {
    name: String,
    version: String,
    logo: Option<String>,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(name: &str, version: &str, logo: Option<&str>, title: &str) -> Self {
        Report {
            name: name.to_string(),
            version: version.to_string(),
            logo: logo.map(str::to_string),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; }
                        header { display: flex; align-items: center; gap: 1em; }
                        header img { height: 48px; }
                        table { border-collapse: collapse; }
                        td, th { border: 1px solid #ddd; padding: 4px 10px; text-align: right; }
                        .plot { margin-bottom: 2em; }"
                    }
                }
                body {
                    header {
                        @if let Some(logo) = &self.logo {
                            img src=(logo) alt=(self.name);
                        }
                        div {
                            h1 { (self.title) }
                            p { (self.name) " v" (self.version) " | generated " (generated) }
                        }
                    }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.render())
    }
}
