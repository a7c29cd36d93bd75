use anyhow::{bail, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::console::Console;
use crate::infra::packages::{Languages, PackageInfo};
use crate::media::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageChoice {
    /// The user entered 0: download nothing for this video.
    Abort,
    /// Zero-based package positions, in the order typed.
    Chosen(Vec<usize>),
}

/// Interactive selection of packages (query mode) and of catalog entries
/// (single mode).
pub trait Chooser {
    fn choose_packages(&mut self, packages: &[PackageInfo]) -> Result<PackageChoice>;

    /// Zero-based position of the chosen catalog entry.
    fn choose_entry(&mut self, catalog: &Catalog) -> Result<usize>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedChoices {
    Abort,
    Picks { valid: Vec<usize>, rejected: Vec<usize> },
}

/// Parse `"1,3"` (ASCII or full-width comma) against `count` packages.
/// Returns `None` when any part is not a number.
pub fn parse_package_choices(input: &str, count: usize) -> Option<ParsedChoices> {
    let numbers: Vec<usize> = input
        .split([',', '，'])
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;

    if numbers.contains(&0) {
        return Some(ParsedChoices::Abort);
    }
    let (valid, rejected): (Vec<usize>, Vec<usize>) =
        numbers.into_iter().partition(|n| *n <= count);
    Some(ParsedChoices::Picks {
        valid: valid.into_iter().map(|n| n - 1).collect(),
        rejected,
    })
}

/// Parse a single 1-based entry number against `count` entries.
pub fn parse_entry_choice(input: &str, count: usize) -> Result<usize, EntryChoiceError> {
    let number: usize = input
        .trim()
        .parse()
        .map_err(|_| EntryChoiceError::NotANumber)?;
    if number == 0 || number > count {
        return Err(EntryChoiceError::OutOfRange);
    }
    Ok(number - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChoiceError {
    NotANumber,
    OutOfRange,
}

pub fn language_badges(languages: Languages) -> String {
    let badge = |flag, text: &str| if languages.has(flag) { text.to_string() } else { "      ".to_string() };
    [
        badge(Languages::SIMPLIFIED, "【简】"),
        badge(Languages::TRADITIONAL, "【繁】"),
        badge(Languages::ENGLISH, "【英】"),
        badge(Languages::BILINGUAL, "【双】"),
    ]
    .concat()
}

pub struct TerminalChooser<'a> {
    console: &'a Console,
    editor: DefaultEditor,
    list_limit: usize,
}

impl<'a> TerminalChooser<'a> {
    pub fn new(console: &'a Console, list_limit: usize) -> Result<Self> {
        Ok(Self {
            console,
            editor: DefaultEditor::new()?,
            list_limit,
        })
    }

    fn read(&mut self) -> Result<String> {
        self.console.blank();
        let prompt = format!("{}  choose subtitle: ", self.console.prefix());
        match self.editor.readline(&prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => bail!("Interrupted"),
            Err(ReadlineError::Eof) => bail!("EOF"),
            Err(err) => Err(err.into()),
        }
    }
}

impl Chooser for TerminalChooser<'_> {
    fn choose_packages(&mut self, packages: &[PackageInfo]) -> Result<PackageChoice> {
        self.console.line(format!("{:>3})  Exit. Not downloading any subtitles.", 0));
        for (i, package) in packages.iter().take(self.list_limit).enumerate() {
            self.console.line(format!(
                "{:>3}) {}  {}",
                i + 1,
                language_badges(package.languages),
                package.name
            ));
        }

        loop {
            let input = self.read()?;
            match parse_package_choices(&input, packages.len()) {
                None => self.console.line(" Error: only numbers accepted"),
                Some(ParsedChoices::Abort) => return Ok(PackageChoice::Abort),
                Some(ParsedChoices::Picks { valid, rejected }) => {
                    for choice in rejected {
                        self.console
                            .line(format!(" Error: choice {choice} not within the range"));
                    }
                    if !valid.is_empty() {
                        return Ok(PackageChoice::Chosen(valid));
                    }
                }
            }
        }
    }

    fn choose_entry(&mut self, catalog: &Catalog) -> Result<usize> {
        self.console.blank();
        for (i, entry) in catalog.entries().iter().enumerate() {
            self.console
                .line(format!("{:>3})  {}", i + 1, entry.decoded_base_name()));
        }

        loop {
            let input = self.read()?;
            match parse_entry_choice(&input, catalog.len()) {
                Ok(pos) => return Ok(pos),
                Err(EntryChoiceError::NotANumber) => {
                    self.console.line(" Error: only numbers accepted")
                }
                Err(EntryChoiceError::OutOfRange) => {
                    self.console.line(" Error: numbers not within the range")
                }
            }
        }
    }
}
