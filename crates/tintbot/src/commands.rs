//! Subcommand arguments and their implementations.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tintbot_core::{
    AcceptancePolicy, BlendWeights, CatalogStore, Color, CoreError, NamerConfig, Snapshot,
    TsvDirSource, UniformSelector, blend, choose, k_nearest,
};

use crate::error::{CliError, Result};
use crate::recent;
use crate::report::{
    BlendReport, ConvertReport, LookupReport, NameReport, NearestEntry, NearestReport, StatsReport,
    emit,
};

/// Shared state for one invocation. The catalog is only loaded when a command
/// needs it.
pub struct Session {
    data_dir: PathBuf,
    config: NamerConfig,
    selector: UniformSelector,
    store: Option<CatalogStore>,
    json: bool,
}

impl Session {
    #[must_use]
    pub fn new(data_dir: PathBuf, config: NamerConfig, seed: Option<u64>, json: bool) -> Self {
        let selector = seed.map_or_else(UniformSelector::new, UniformSelector::seeded);
        Self {
            data_dir,
            config,
            selector,
            store: None,
            json,
        }
    }

    #[must_use]
    pub fn config(&self) -> &NamerConfig {
        &self.config
    }

    pub fn snapshot(&mut self) -> Result<Arc<Snapshot>> {
        if let Some(store) = &self.store {
            return Ok(store.snapshot());
        }
        let store = CatalogStore::open(
            TsvDirSource::new(&self.data_dir),
            self.config.store_options(),
            &mut self.selector,
        )?;
        let snapshot = store.snapshot();
        self.store = Some(store);
        Ok(snapshot)
    }

    /// A color code, or a catalog name resolved through the selector.
    fn resolve(&mut self, operand: &str) -> Result<(Color, bool)> {
        if looks_like_code(operand) {
            return Ok((Color::parse(operand)?, false));
        }
        let snapshot = self.snapshot()?;
        let color = snapshot
            .catalog()
            .lookup_by_name(operand)
            .and_then(|colors| choose(&mut self.selector, colors))
            .ok_or_else(|| CoreError::not_found(operand))?;
        Ok((color, true))
    }
}

fn looks_like_code(text: &str) -> bool {
    text.starts_with('#') || text.starts_with("0x")
}

// ---------------------------------------------------------------------------
// name
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct NameArgs {
    /// Target color, `#rrggbb` or `0xrrggbb`.
    pub color: String,

    /// Number of names to return.
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Drop names farther than this Lab distance.
    #[arg(long, conflicts_with = "no_max_distance")]
    pub max_distance: Option<f64>,

    /// Keep names at any distance.
    #[arg(long)]
    pub no_max_distance: bool,

    /// JSON array of recently used names.
    #[arg(long)]
    pub recent_file: Option<PathBuf>,

    /// Record the best name in the recent file.
    #[arg(long, requires = "recent_file")]
    pub remember: bool,
}

pub fn run_name(session: &mut Session, args: NameArgs, out: &mut dyn Write) -> Result<()> {
    let target = Color::parse(args.color.as_str())?;
    let k = args.k.unwrap_or(session.config.k);
    let policy = if args.no_max_distance {
        AcceptancePolicy::unbounded()
    } else {
        AcceptancePolicy::new(args.max_distance.or(session.config.max_distance))
    };

    let mut memory = match &args.recent_file {
        Some(path) => recent::load(path, session.config.recent_capacity)?,
        None => session.config.recent_memory()?,
    };

    let snapshot = session.snapshot()?;
    let named = snapshot.name_color(&target, k, &memory)?;
    let found = named.len();
    let names = policy.apply(named);
    let beyond_max_distance = found - names.len();

    let mut remembered = None;
    if args.remember {
        if let (Some(best), Some(path)) = (names.first(), &args.recent_file) {
            memory.remember(best.name.clone());
            recent::save(path, &memory)?;
            remembered = Some(best.name.clone());
        }
    }

    tracing::debug!(target_color = %target, found, kept = names.len(), "name command");
    emit(
        &NameReport {
            target,
            names,
            beyond_max_distance,
            remembered,
        },
        session.json,
        out,
    )
}

// ---------------------------------------------------------------------------
// blend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct BlendArgs {
    /// Head color or catalog name.
    pub head: String,

    /// Modifier color or catalog name.
    pub modifier: String,

    /// Head share on every Lab channel, in [0, 1].
    #[arg(long, conflicts_with = "weights")]
    pub head_amount: Option<f64>,

    /// Per-channel head shares as `L,A,B`.
    #[arg(long, value_parser = parse_weights)]
    pub weights: Option<[f64; 3]>,
}

fn parse_weights(raw: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [l, a, b] = parts.as_slice() else {
        return Err(format!("expected three comma-separated weights, got {raw:?}"));
    };
    let number = |part: &str| {
        part.parse::<f64>()
            .map_err(|_| format!("cannot parse weight {part:?}"))
    };
    Ok([number(*l)?, number(*a)?, number(*b)?])
}

pub fn run_blend(session: &mut Session, args: BlendArgs, out: &mut dyn Write) -> Result<()> {
    let weights = match (args.weights, args.head_amount) {
        (Some([l, a, b]), _) => BlendWeights::new(l, a, b)?,
        (None, Some(amount)) => BlendWeights::uniform(amount)?,
        (None, None) => BlendWeights::EVEN,
    };

    let (head, head_is_name) = session.resolve(&args.head)?;
    let (modifier, modifier_is_name) = session.resolve(&args.modifier)?;
    let color = blend(&head, &modifier, weights);

    let name = (head_is_name && modifier_is_name).then(|| format!("{} {}", args.head, args.modifier));
    let stereotype = match &session.store {
        Some(store) => store
            .snapshot()
            .catalog()
            .lookup_by_color(&color)
            .map(|(stereotype, _)| stereotype.to_string()),
        None => None,
    };

    emit(
        &BlendReport {
            head,
            modifier,
            weights: weights.as_array(),
            color,
            name,
            stereotype,
        },
        session.json,
        out,
    )
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    /// Catalog name, or a color code for a reverse lookup.
    pub query: String,
}

pub fn run_lookup(session: &mut Session, args: LookupArgs, out: &mut dyn Write) -> Result<()> {
    let snapshot = session.snapshot()?;
    let catalog = snapshot.catalog();

    let report = if looks_like_code(&args.query) {
        let color = Color::parse(args.query.as_str())?;
        let (stereotype, base_color) = catalog
            .lookup_by_color(&color)
            .ok_or_else(|| CoreError::not_found(color.to_html()))?;
        LookupReport {
            query: args.query.clone(),
            colors: vec![color],
            stereotype: Some(stereotype.to_string()),
            base_color: Some(base_color.to_string()),
        }
    } else {
        let colors = catalog
            .lookup_by_name(&args.query)
            .ok_or_else(|| CoreError::not_found(args.query.as_str()))?;
        LookupReport {
            query: args.query.clone(),
            colors: colors.to_vec(),
            stereotype: None,
            base_color: None,
        }
    };

    emit(&report, session.json, out)
}

// ---------------------------------------------------------------------------
// nearest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct NearestArgs {
    /// Target color, `#rrggbb` or `0xrrggbb`.
    pub color: String,

    /// Number of catalog entries to list.
    #[arg(short, long)]
    pub k: Option<usize>,
}

pub fn run_nearest(session: &mut Session, args: NearestArgs, out: &mut dyn Write) -> Result<()> {
    let target = Color::parse(args.color.as_str())?;
    let k = args.k.unwrap_or(session.config.k);
    let snapshot = session.snapshot()?;

    let neighbors = k_nearest(&target, snapshot.catalog().entries(), k)?
        .into_iter()
        .map(|neighbor| NearestEntry {
            stereotype: neighbor.item.stereotype.clone(),
            base_color: neighbor.item.base_color.clone(),
            color: neighbor.item.color,
            distance: neighbor.distance,
        })
        .collect();

    emit(&NearestReport { target, neighbors }, session.json, out)
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// `#rrggbb`, `0xrrggbb`, or `r,g,b`.
    pub color: String,
}

pub fn run_convert(session: &Session, args: ConvertArgs, out: &mut dyn Write) -> Result<()> {
    let color = parse_any(&args.color)?;
    emit(&ConvertReport::new(&color), session.json, out)
}

fn parse_any(raw: &str) -> Result<Color> {
    if looks_like_code(raw) {
        return Ok(Color::parse(raw)?);
    }
    let channels: Vec<i64> = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| CliError::invalid(format!("cannot parse {raw:?} as a color")))
        })
        .collect::<Result<_>>()?;
    match channels.as_slice() {
        &[r, g, b] => Ok(Color::parse((r, g, b))?),
        _ => Err(CliError::invalid(format!(
            "expected #rrggbb, 0xrrggbb or r,g,b, got {raw:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

pub fn run_stats(session: &mut Session, out: &mut dyn Write) -> Result<()> {
    let snapshot = session.snapshot()?;
    let summary = snapshot.catalog().summary();
    let report = StatsReport {
        source: session.data_dir.display().to_string(),
        entries: summary.entries,
        skipped: summary.skipped,
        unigrams: summary.unigrams,
        splits: summary.splits,
        table: snapshot.table().len(),
        unresolved_splits: snapshot.table().skipped(),
        errors: summary.errors.iter().map(ToString::to_string).collect(),
    };
    emit(&report, session.json, out)
}

/// Read a `key=value` profile file into a config.
pub fn load_profile(path: &std::path::Path) -> Result<NamerConfig> {
    let content = fs::read_to_string(path).map_err(|source| CliError::read_file(path, source))?;
    Ok(NamerConfig::from_profile_content(&content)?)
}
