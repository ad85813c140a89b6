//! Named radial/transverse velocity moments as functions of separation.
//!
//! A [`MomentSet`] maps keys such as `m_10` (raw, radial order 1) or `c_22`
//! (central, radial 2, transverse 2) to callables `r -> value`. Moments fixed
//! by symmetry are never stored: odd transverse orders vanish by isotropy,
//! first-order central moments vanish by construction, and `M(0,0) = 1`.
use crate::moments::errors::{MomentError, MomentResult};
use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

/// Shared, thread-safe moment callable.
pub type MomentFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MomentMode {
    /// Moments about the mean; prefix `c`.
    Central,
    /// Moments about zero; prefix `m`.
    Raw,
}

impl MomentMode {
    pub fn prefix(self) -> &'static str {
        match self {
            MomentMode::Central => "c",
            MomentMode::Raw => "m",
        }
    }
}

impl FromStr for MomentMode {
    type Err = MomentError;

    /// Accepts `central`/`c` and `raw`/`m`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "central" | "c" => Ok(MomentMode::Central),
            "raw" | "m" => Ok(MomentMode::Raw),
            _ => Err(MomentError::InvalidMomentName {
                name: s.to_string(),
                reason: "Mode must be 'central' ('c') or 'raw' ('m').",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MomentKey {
    pub mode: MomentMode,
    pub radial: u8,
    pub transverse: u8,
}

impl MomentKey {
    pub const fn new(mode: MomentMode, radial: u8, transverse: u8) -> Self {
        Self { mode, radial, transverse }
    }

    pub const fn central(radial: u8, transverse: u8) -> Self {
        Self::new(MomentMode::Central, radial, transverse)
    }

    pub const fn raw(radial: u8, transverse: u8) -> Self {
        Self::new(MomentMode::Raw, radial, transverse)
    }

    pub fn order(&self) -> u8 {
        self.radial + self.transverse
    }

    /// Value fixed by symmetry, if any.
    ///
    /// - `M(0,0) = 1`
    /// - odd transverse order: `0`
    /// - central mode, total order 1: `0`
    pub fn structural_value(&self) -> Option<f64> {
        if self.radial == 0 && self.transverse == 0 {
            Some(1.0)
        } else if self.transverse % 2 == 1 {
            Some(0.0)
        } else if self.mode == MomentMode::Central && self.order() == 1 {
            Some(0.0)
        } else {
            None
        }
    }
}

impl fmt::Display for MomentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}{}", self.mode.prefix(), self.radial, self.transverse)
    }
}

impl FromStr for MomentKey {
    type Err = MomentError;

    /// Parse `{c|m}_{k}{j}` with single-digit orders.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| MomentError::InvalidMomentName { name: s.to_string(), reason };
        let (prefix, orders) =
            s.split_once('_').ok_or_else(|| invalid("Expected '<c|m>_<k><j>'."))?;
        let mode = match prefix {
            "c" => MomentMode::Central,
            "m" => MomentMode::Raw,
            _ => return Err(invalid("Prefix must be 'c' (central) or 'm' (raw).")),
        };
        let digits: Vec<u8> = orders
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| invalid("Orders must be decimal digits."))?;
        match digits.as_slice() {
            [radial, transverse] => Ok(MomentKey::new(mode, *radial, *transverse)),
            _ => Err(invalid("Expected exactly two order digits.")),
        }
    }
}

/// Immutable-by-convention collection of moment callables.
#[derive(Clone, Default)]
pub struct MomentSet {
    entries: BTreeMap<MomentKey, MomentFn>,
}

impl fmt::Debug for MomentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.entries.keys().map(MomentKey::to_string).collect();
        f.debug_struct("MomentSet").field("moments", &names).finish()
    }
}

impl MomentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion by name, e.g. `.with("c_20", |r| ...)`.
    ///
    /// # Errors
    /// - [`MomentError::InvalidMomentName`] for malformed names or moments
    ///   fixed by symmetry (`c_10`, `m_11`, ...).
    pub fn with<F>(mut self, name: &str, f: F) -> MomentResult<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let key: MomentKey = name.parse()?;
        self.insert(key, f)?;
        Ok(self)
    }

    /// Insert or replace a moment.
    ///
    /// # Errors
    /// - [`MomentError::InvalidMomentName`] for keys fixed by symmetry.
    pub fn insert<F>(&mut self, key: MomentKey, f: F) -> MomentResult<()>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if key.structural_value().is_some() {
            return Err(MomentError::InvalidMomentName {
                name: key.to_string(),
                reason: "Moment is fixed by symmetry and cannot be supplied.",
            });
        }
        self.entries.insert(key, Arc::new(f));
        Ok(())
    }

    pub fn contains(&self, key: &MomentKey) -> bool {
        key.structural_value().is_some() || self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MomentKey> {
        self.entries.keys()
    }

    /// Fail with [`MomentError::MissingMoment`] on the first absent key.
    pub fn require(&self, keys: &[MomentKey]) -> MomentResult<()> {
        match keys.iter().find(|k| !self.contains(k)) {
            Some(key) => Err(MomentError::MissingMoment { name: key.to_string() }),
            None => Ok(()),
        }
    }

    /// `M(k, j)` at separation `r`, applying the symmetry rules first.
    pub fn moment(&self, key: &MomentKey, r: f64) -> MomentResult<f64> {
        if let Some(value) = key.structural_value() {
            return Ok(value);
        }
        self.entries
            .get(key)
            .map(|f| f(r))
            .ok_or_else(|| MomentError::MissingMoment { name: key.to_string() })
    }
}
