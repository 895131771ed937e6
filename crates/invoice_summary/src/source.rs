use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};
use std::path::PathBuf;

use crate::{Result, SummaryError};

/// Supplies the workbook to process. `Ok(None)` means the user chose nothing.
pub trait FileSource {
    fn select(&mut self) -> Result<Option<PathBuf>>;
}

/// A path given up front, typically on the command line.
#[derive(Debug, Clone)]
pub struct ArgFileSource {
    path: Option<PathBuf>,
}

impl ArgFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl FileSource for ArgFileSource {
    fn select(&mut self) -> Result<Option<PathBuf>> {
        Ok(self.path.take())
    }
}

/// Asks for a path on a line-oriented input. An empty answer or end of input is no selection.
pub struct PromptFileSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptFileSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptFileSource<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> FileSource for PromptFileSource<R, W> {
    fn select(&mut self) -> Result<Option<PathBuf>> {
        let extensions: Vec<String> = WORKBOOK_EXTENSIONS.iter().map(|e| format!(".{e}")).collect();
        write!(self.output, "Path to invoice workbook ({}): ", extensions.join("/"))?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        // drag-and-drop into a terminal often quotes the path
        let answer = line.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if answer.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(answer)))
    }
}

/// Native "open file" dialog filtered to workbooks. Closing it is no selection.
#[cfg(feature = "dialog")]
#[derive(Debug, Clone)]
pub struct DialogFileSource {
    title: String,
}

#[cfg(feature = "dialog")]
impl DialogFileSource {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

#[cfg(feature = "dialog")]
impl Default for DialogFileSource {
    fn default() -> Self {
        Self::new("Select invoice workbook")
    }
}

#[cfg(feature = "dialog")]
impl FileSource for DialogFileSource {
    fn select(&mut self) -> Result<Option<PathBuf>> {
        Ok(rfd::FileDialog::new()
            .set_title(&self.title)
            .add_filter("Excel", WORKBOOK_EXTENSIONS)
            .pick_file())
    }
}

/// Extensions offered by interactive sources.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// The source for a run: the given path, otherwise the file dialog when built
/// with the `dialog` feature, otherwise a stdin prompt.
pub fn input_source(input: Option<PathBuf>) -> Box<dyn FileSource> {
    match input {
        Some(path) => Box::new(ArgFileSource::new(path)),
        None => interactive_source(),
    }
}

#[cfg(feature = "dialog")]
fn interactive_source() -> Box<dyn FileSource> {
    Box::new(DialogFileSource::default())
}

#[cfg(not(feature = "dialog"))]
fn interactive_source() -> Box<dyn FileSource> {
    Box::new(PromptFileSource::stdio())
}

/// Runs a source once, turning "no selection" into [`SummaryError::NoInputSelected`].
pub fn select_input<S: FileSource + ?Sized>(source: &mut S) -> Result<PathBuf> {
    source.select()?.ok_or(SummaryError::NoInputSelected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_arg_source_yields_path_once() {
        let mut source = ArgFileSource::new("invoice.xlsx");
        assert_eq!(select_input(&mut source).unwrap(), PathBuf::from("invoice.xlsx"));
        assert!(matches!(
            select_input(&mut source),
            Err(SummaryError::NoInputSelected)
        ));
    }

    #[test]
    fn test_prompt_reads_quoted_path() {
        let mut out = Vec::new();
        let mut source = PromptFileSource::new(Cursor::new("  \"C:\\Накладные\\март.xlsx\"\n"), &mut out);

        let path = select_input(&mut source).unwrap();
        assert_eq!(path, PathBuf::from("C:\\Накладные\\март.xlsx"));
        assert!(String::from_utf8(out).unwrap().starts_with("Path to invoice workbook"));
    }

    #[test]
    fn test_input_source_prefers_given_path() {
        let mut source = input_source(Some(PathBuf::from("march.xls")));
        assert_eq!(select_input(source.as_mut()).unwrap(), PathBuf::from("march.xls"));
    }

    #[cfg(feature = "dialog")]
    #[test]
    fn test_dialog_source_title() {
        assert_eq!(DialogFileSource::default().title, "Select invoice workbook");
        assert_eq!(DialogFileSource::new("Накладная").title, "Накладная");
    }

    #[test]
    fn test_prompt_empty_answer_is_no_selection() {
        let mut source = PromptFileSource::new(Cursor::new("\n"), Vec::new());
        assert!(matches!(
            select_input(&mut source),
            Err(SummaryError::NoInputSelected)
        ));

        let mut source = PromptFileSource::new(Cursor::new(""), Vec::new());
        assert!(source.select().unwrap().is_none());
    }
}
