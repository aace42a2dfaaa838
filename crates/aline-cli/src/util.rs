use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::PathBuf,
};

use aline_cohort::{
    CohortSchema, CohortTable,
    bins::Bin,
    loader::{CohortLoader, LoaderOptions},
    profile::Gender,
};
use anyhow::Context;
use clap::Args;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            eprintln!("Saved JSON to {}", path.display());
        }
        Ok(())
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Input file arguments shared by every command.
#[derive(Debug, Clone, Args)]
pub(crate) struct DataArg {
    /// Path to the cohort CSV file
    pub data: PathBuf,

    /// Field delimiter of the cohort file
    #[arg(long, default_value_t = ',', value_parser = parse_delimiter)]
    pub delimiter: char,

    /// Write the result as JSON to this path instead of printing tables
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn parse_delimiter(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}

/// Load the cohort file with the fixed arterial-line schema.
pub(crate) fn load_cohort(arg: &DataArg) -> anyhow::Result<CohortTable> {
    eprintln!("Loading cohort from {}...", arg.data.display());
    let options = LoaderOptions {
        delimiter: u8::try_from(arg.delimiter).context("Delimiter must be ASCII")?,
        ..LoaderOptions::default()
    };
    let table = CohortLoader::new(CohortSchema::arterial_line())
        .with_options(options)
        .load(&arg.data)
        .with_context(|| format!("Failed to load cohort file: {}", arg.data.display()))?;

    let imputed = table.imputation().total_filled();
    tracing::debug!(
        rows = table.row_count(),
        columns = table.columns().len(),
        imputed,
        "cohort loaded"
    );
    eprintln!(
        "Loaded {} patients ({} missing values imputed)",
        table.row_count(),
        imputed
    );
    Ok(table)
}

fn unknown_label<'a>(kind: &str, label: &str, expected: impl Iterator<Item = &'a str>) -> String {
    format!(
        "unknown {kind} '{label}' (expected one of: {})",
        expected.collect::<Vec<_>>().join(", ")
    )
}

/// Parse a bin label such as `20-29` or `>=110`.
pub(crate) fn parse_bin<B>(label: &str) -> Result<B, String>
where
    B: Bin,
{
    B::from_label(label)
        .ok_or_else(|| unknown_label("group", label, B::ALL.iter().map(|b| b.label())))
}

pub(crate) fn parse_gender(label: &str) -> Result<Gender, String> {
    Gender::from_label(label)
        .ok_or_else(|| unknown_label("gender", label, Gender::ALL.iter().map(|g| g.label())))
}

/// Format an optional value, or `N/A`.
pub(crate) fn opt_fmt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.precision$}"))
}
