//! Structured cortical regions and lobes
//!
//! Region labels arrive from the parcellation step as strings such as
//! `ctx-lh-precentral_1`. They are parsed once at the metadata boundary into a
//! [`Region`]; nothing downstream slices label strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

const CORTICAL_PREFIX: &str = "ctx-";

/// Cerebral hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    /// Two-letter code used in parcellation labels
    pub fn code(&self) -> &'static str {
        match self {
            Self::Left => "lh",
            Self::Right => "rh",
        }
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lh" => Ok(Self::Left),
            "rh" => Ok(Self::Right),
            other => Err(Error::InvalidInput(format!("Unknown hemisphere '{other}'"))),
        }
    }
}

/// A cortical region: hemisphere plus bare region name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region {
    pub hemisphere: Hemisphere,
    pub name: String,
}

impl Region {
    pub fn new(hemisphere: Hemisphere, name: impl Into<String>) -> Self {
        Self {
            hemisphere,
            name: name.into(),
        }
    }

    /// Parse a parcellation label
    ///
    /// Returns `Ok(None)` for labels that are not cortical (e.g.
    /// `Left-Hippocampus`, `Unknown`); such channels carry no region. A label
    /// that starts with `ctx-` but is otherwise malformed is an error.
    ///
    /// ```rust
    /// use spindle_core::{Hemisphere, Region};
    ///
    /// let region = Region::parse_label("ctx-rh-superiortemporal_2").unwrap().unwrap();
    /// assert_eq!(region.hemisphere, Hemisphere::Right);
    /// assert_eq!(region.name, "superiortemporal_2");
    /// assert!(Region::parse_label("Right-Putamen").unwrap().is_none());
    /// ```
    pub fn parse_label(label: &str) -> Result<Option<Self>> {
        let Some(rest) = label.strip_prefix(CORTICAL_PREFIX) else {
            return Ok(None);
        };
        let (hemi, name) = rest
            .split_once('-')
            .ok_or_else(|| Error::InvalidInput(format!("Malformed cortical label '{label}'")))?;
        if name.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Cortical label '{label}' has no region name"
            )));
        }
        Ok(Some(Self::new(hemi.parse()?, name)))
    }

    /// Region name without a parcellation subdivision suffix
    /// (`precentral_3` → `precentral`)
    pub fn base_name(&self) -> &str {
        strip_subdivision(&self.name)
    }

    pub fn lobe(&self) -> Lobe {
        Lobe::of(&self.name)
    }

    /// Human-readable name, e.g. `rostralmiddlefrontal_2` →
    /// `rostral middle frontal (2)`
    pub fn display_name(&self) -> String {
        pretty_region_name(&self.name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", CORTICAL_PREFIX, self.hemisphere.code(), self.name)
    }
}

fn strip_subdivision(name: &str) -> &str {
    match name.rsplit_once('_') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) => {
            base
        }
        _ => name,
    }
}

/// Render a parcellation region name for reports
pub fn pretty_region_name(name: &str) -> String {
    let (base, subdivision) = match name.split_once('_') {
        Some((base, rest)) => (base, Some(rest)),
        None => (name, None),
    };
    let mut s = base.to_string();
    for (from, to) in [
        ("medial", "medial "),
        ("lateral", "lateral "),
        ("superior", "superior "),
        ("middle", "middle "),
        ("inferior", "inferior "),
        ("rostral", "rostral "),
        ("caudal", "caudal "),
        ("orbito", "orbital "),
        ("pars", "pars "),
        ("pole", " pole"),
    ] {
        s = s.replace(from, to);
    }
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    match subdivision {
        Some(sub) => format!("{s} ({sub})"),
        None => s,
    }
}

/// Cerebral lobe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lobe {
    Frontal,
    Parietal,
    Temporal,
    Occipital,
    Insula,
    Unknown,
}

const FRONTAL: &[&str] = &[
    "caudalanteriorcingulate",
    "caudalmiddlefrontal",
    "lateralorbitofrontal",
    "medialorbitofrontal",
    "paracentral",
    "parsopercularis",
    "parsorbitalis",
    "parstriangularis",
    "precentral",
    "rostralanteriorcingulate",
    "rostralmiddlefrontal",
    "superiorfrontal",
    "frontalpole",
];

const PARIETAL: &[&str] = &[
    "inferiorparietal",
    "isthmuscingulate",
    "postcentral",
    "posteriorcingulate",
    "precuneus",
    "superiorparietal",
    "supramarginal",
];

const TEMPORAL: &[&str] = &[
    "bankssts",
    "entorhinal",
    "fusiform",
    "inferiortemporal",
    "middletemporal",
    "parahippocampal",
    "superiortemporal",
    "transversetemporal",
    "temporalpole",
];

const OCCIPITAL: &[&str] = &["cuneus", "lateraloccipital", "lingual", "pericalcarine"];

impl Lobe {
    pub const ALL: [Lobe; 6] = [
        Lobe::Frontal,
        Lobe::Parietal,
        Lobe::Temporal,
        Lobe::Occipital,
        Lobe::Insula,
        Lobe::Unknown,
    ];

    /// Lobe of a region name; subdivision suffixes are ignored
    pub fn of(region_name: &str) -> Self {
        let base = strip_subdivision(region_name);
        if FRONTAL.contains(&base) {
            Self::Frontal
        } else if PARIETAL.contains(&base) {
            Self::Parietal
        } else if TEMPORAL.contains(&base) {
            Self::Temporal
        } else if OCCIPITAL.contains(&base) {
            Self::Occipital
        } else if base == "insula" {
            Self::Insula
        } else {
            Self::Unknown
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Frontal => "frontal",
            Self::Parietal => "parietal",
            Self::Temporal => "temporal",
            Self::Occipital => "occipital",
            Self::Insula => "insula",
            Self::Unknown => "unknown",
        }
    }
}
