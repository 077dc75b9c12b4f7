//! Interactive version picker.

use crate::catalog::{discover, Catalog};
use crate::config::{save_preferences_to, with_install_path};
use crate::error::CatalogError;
use crate::launch::launch;
use crate::selection::{classify, Choice};
use crate::types::Preferences;
use anyhow::Result;
use console::style;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Child;

pub enum MenuOutcome {
    Launched(Child),
    Quit,
}

pub struct Menu<R, W> {
    input: R,
    output: W,
    prefs: Preferences,
    prefs_path: PathBuf,
    root: PathBuf,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, prefs: Preferences, prefs_path: PathBuf, root: PathBuf) -> Self {
        Self {
            input,
            output,
            prefs,
            prefs_path,
            root,
        }
    }

    pub fn run(&mut self) -> Result<MenuOutcome> {
        loop {
            let catalog = match discover(&self.root) {
                Ok(catalog) => catalog,
                Err(CatalogError::Discovery(e)) => {
                    writeln!(self.output, "{}", style(e).red())?;
                    if self.configure()? {
                        continue;
                    }
                    return Ok(MenuOutcome::Quit);
                }
                Err(e) => return Err(e.into()),
            };

            if catalog.is_empty() {
                writeln!(
                    self.output,
                    "{}",
                    style(format!(
                        "No Loxone Config installations found in {}",
                        self.root.display()
                    ))
                    .yellow()
                )?;
                if self.configure()? {
                    continue;
                }
                return Ok(MenuOutcome::Quit);
            }

            self.render(&catalog)?;

            loop {
                write!(self.output, "Select version [Enter = newest]: ")?;
                self.output.flush()?;
                let Some(line) = self.read_line()? else {
                    return Ok(MenuOutcome::Quit);
                };

                match classify(&line, catalog.len()) {
                    choice @ (Choice::Latest | Choice::SelectOrdinal(_)) => {
                        let Some(record) = catalog.resolve(&choice) else {
                            continue;
                        };
                        writeln!(
                            self.output,
                            "Starting Loxone Config {}...",
                            style(record.version_display()).green()
                        )?;
                        let child = launch(record)?;
                        return Ok(MenuOutcome::Launched(child));
                    }
                    Choice::Quit => return Ok(MenuOutcome::Quit),
                    Choice::Configure => {
                        self.configure()?;
                        break;
                    }
                    Choice::Invalid => {
                        writeln!(
                            self.output,
                            "{}",
                            style(format!(
                                "Invalid choice '{}'. Enter 1-{}, c or q.",
                                line.trim(),
                                catalog.len()
                            ))
                            .red()
                        )?;
                    }
                }
            }
        }
    }

    fn render(&mut self, catalog: &Catalog) -> Result<()> {
        writeln!(
            self.output,
            "{}",
            style(format!("Loxone Config versions in {}", self.root.display())).bold()
        )?;
        for record in catalog {
            let marker = if record.ordinal() == 1 { " (newest)" } else { "" };
            writeln!(
                self.output,
                "  {:>2}) {:<14} {}{}",
                record.ordinal(),
                record.version_display(),
                style(record.folder_name()).dim(),
                marker
            )?;
        }
        writeln!(self.output, "   c) change installation directory")?;
        writeln!(self.output, "   q) quit")?;
        Ok(())
    }

    /// Ask for a new installation directory until a valid one is given.
    ///
    /// Returns false when the user cancels. A valid path is saved right away.
    fn configure(&mut self) -> Result<bool> {
        loop {
            write!(
                self.output,
                "Installation directory (empty to cancel): "
            )?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(false);
            };
            let line = line.trim().trim_matches('"');
            if line.is_empty() || line.eq_ignore_ascii_case("q") {
                return Ok(false);
            }

            match with_install_path(self.prefs.clone(), Path::new(line)) {
                Ok(prefs) => {
                    save_preferences_to(&self.prefs_path, &prefs)?;
                    self.root = prefs
                        .install_path
                        .as_deref()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(line));
                    self.prefs = prefs;
                    tracing::info!("Installation directory set to {}", self.root.display());
                    return Ok(true);
                }
                Err(e) => writeln!(self.output, "{}", style(e).red())?,
            }
        }
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
