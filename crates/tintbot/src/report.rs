//! Command results and how they are printed.
//!
//! Every command produces one report. With `--json` the report is printed as
//! pretty JSON; otherwise as a few aligned text lines.

use std::io::Write;

use serde::Serialize;
use tintbot_core::{Color, NamedColor};

use crate::error::Result;

pub trait Render: Serialize {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Print `report` as JSON or text.
pub fn emit<R: Render>(report: &R, json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
    } else {
        report.render_text(out)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub html: String,
    pub hex: String,
    pub rgb: [u8; 3],
    pub lab: [f64; 3],
}

impl ConvertReport {
    #[must_use]
    pub fn new(color: &Color) -> Self {
        let (r, g, b) = color.to_rgb();
        let (l, a, lab_b) = color.to_lab();
        Self {
            html: color.to_html(),
            hex: color.to_hex(),
            rgb: [r, g, b],
            lab: [l, a, lab_b],
        }
    }
}

impl Render for ConvertReport {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let [r, g, b] = self.rgb;
        let [l, a, lab_b] = self.lab;
        writeln!(out, "html  {}", self.html)?;
        writeln!(out, "hex   {}", self.hex)?;
        writeln!(out, "rgb   {r} {g} {b}")?;
        writeln!(out, "lab   {l:.3} {a:.3} {lab_b:.3}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NameReport {
    pub target: Color,
    pub names: Vec<NamedColor>,
    /// Approved names dropped by the distance cutoff.
    pub beyond_max_distance: usize,
    pub remembered: Option<String>,
}

impl Render for NameReport {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.names.is_empty() {
            writeln!(out, "no acceptable name for {}", self.target)?;
        }
        for named in &self.names {
            writeln!(out, "{:<32} {} {:>8.3}", named.name, named.color, named.distance)?;
        }
        if let Some(name) = &self.remembered {
            writeln!(out, "remembered {name:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlendReport {
    pub head: Color,
    pub modifier: Color,
    pub weights: [f64; 3],
    pub color: Color,
    /// `head modifier` when both operands were catalog names.
    pub name: Option<String>,
    /// Catalog entry with exactly the blended color, if any.
    pub stereotype: Option<String>,
}

impl Render for BlendReport {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let [l, a, b] = self.weights;
        writeln!(out, "{} + {} @ ({l}, {a}, {b}) = {}", self.head, self.modifier, self.color)?;
        if let Some(name) = &self.name {
            writeln!(out, "name       {name}")?;
        }
        if let Some(stereotype) = &self.stereotype {
            writeln!(out, "catalog    {stereotype}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub query: String,
    pub colors: Vec<Color>,
    pub stereotype: Option<String>,
    pub base_color: Option<String>,
}

impl Render for LookupReport {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if let (Some(stereotype), Some(base_color)) = (&self.stereotype, &self.base_color) {
            writeln!(out, "{} is {stereotype} ({base_color})", self.query)?;
        }
        for color in &self.colors {
            writeln!(out, "{color}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearestEntry {
    pub stereotype: String,
    pub base_color: String,
    pub color: Color,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearestReport {
    pub target: Color,
    pub neighbors: Vec<NearestEntry>,
}

impl Render for NearestReport {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for entry in &self.neighbors {
            writeln!(
                out,
                "{:<24} {:<12} {} {:>8.3}",
                entry.stereotype, entry.base_color, entry.color, entry.distance
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub source: String,
    pub entries: usize,
    pub skipped: usize,
    pub unigrams: usize,
    pub splits: usize,
    pub table: usize,
    pub unresolved_splits: usize,
    pub errors: Vec<String>,
}

impl Render for StatsReport {
    fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "source             {}", self.source)?;
        writeln!(out, "entries            {}", self.entries)?;
        writeln!(out, "skipped rows       {}", self.skipped)?;
        writeln!(out, "unigrams           {}", self.unigrams)?;
        writeln!(out, "splits             {}", self.splits)?;
        writeln!(out, "blended names      {}", self.table)?;
        writeln!(out, "unresolved splits  {}", self.unresolved_splits)?;
        for error in &self.errors {
            writeln!(out, "  {error}")?;
        }
        Ok(())
    }
}
