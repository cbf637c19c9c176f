use std::io::{self, Write};

use itertools::Itertools;

use crate::itemsets::LevelReport;

pub const TITLE: &str =
    "Group Size (k) | Used Threshold | Max Frequency Count | Example Author Groups";

/// Renders level reports as a plain text table.
pub struct TableReport<W: Write> {
    writer: W,
}

impl<W: Write> TableReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn header(&mut self) -> io::Result<()> {
        let rule = "-".repeat(TITLE.len());
        writeln!(self.writer)?;
        writeln!(self.writer, "{rule}")?;
        writeln!(self.writer, "{TITLE}")?;
        writeln!(self.writer, "{rule}")
    }

    pub fn row(&mut self, level: &LevelReport) -> io::Result<()> {
        writeln!(
            self.writer,
            "{:14} | {:14} | {:19} | {}",
            level.size,
            level.threshold,
            level.max_count,
            format_groups(&level.top_groups)
        )
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// `A, B` for single authors, `(A, B), (C, D)` for larger groups.
pub fn format_groups(groups: &[Vec<String>]) -> String {
    groups
        .iter()
        .map(|group| {
            if group.len() == 1 {
                group[0].clone()
            } else {
                format!("({})", group.join(", "))
            }
        })
        .join(", ")
}
