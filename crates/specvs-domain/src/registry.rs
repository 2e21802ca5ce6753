//! The attribute registry: every comparable spec, resolved and validated.
//!
//! Normalizer and display-formatter names from the registry file are turned
//! into function values here, once. A name that does not resolve is a
//! configuration gap: it is logged and the attribute compares raw values.

use specvs_error::RegistryError;
use specvs_normalize::{DisplayFormatter, Normalizer};
use specvs_types::{
    AttributeEntry, CompositeEntry, CompositeFormat, DiffFormat, Direction, EngineSettings,
    RegistryFile,
};
use std::collections::BTreeMap;
use tracing::warn;

/// How two values of an attribute are ordered.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonMode {
    Numeric(Direction),

    /// Lowercase categories, worst to best.
    Ranking(Vec<String>),

    /// Display-only; never produces a winner.
    Unranked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDefinition {
    pub children: Vec<String>,
    pub score_key: Option<String>,
    pub score_diff_threshold: f64,
    pub format: CompositeFormat,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub mode: ComparisonMode,
    pub diff_format: DiffFormat,
    pub min_diff: Option<f64>,
    pub percentage_threshold: Option<f64>,
    pub require_valid_pair: bool,
    pub presence_wins: bool,
    pub normalizer: Option<Normalizer>,
    pub display: Option<DisplayFormatter>,
    pub fallback_for: Option<String>,
    pub priority: i32,
    pub tooltip: Option<String>,
    pub headline: Option<String>,
    pub composite: Option<CompositeDefinition>,
}

impl AttributeDefinition {
    fn bare(key: &str, label: &str, mode: ComparisonMode) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            unit: String::new(),
            mode,
            diff_format: DiffFormat::Better,
            min_diff: None,
            percentage_threshold: None,
            require_valid_pair: false,
            presence_wins: false,
            normalizer: None,
            display: None,
            fallback_for: None,
            priority: 0,
            tooltip: None,
            headline: None,
            composite: None,
        }
    }

    pub fn numeric(key: &str, label: &str, direction: Direction) -> Self {
        Self::bare(key, label, ComparisonMode::Numeric(direction))
    }

    pub fn ranked<S: AsRef<str>>(key: &str, label: &str, ranking: &[S]) -> Self {
        let ranking = ranking
            .iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .collect();
        Self::bare(key, label, ComparisonMode::Ranking(ranking))
    }

    pub fn composite(key: &str, label: &str, composite: CompositeDefinition) -> Self {
        let mut def = Self::bare(key, label, ComparisonMode::Unranked);
        def.composite = Some(composite);
        def
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn format(mut self, format: DiffFormat) -> Self {
        self.diff_format = format;
        self
    }

    pub fn min_diff(mut self, min_diff: f64) -> Self {
        self.min_diff = Some(min_diff);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn require_valid_pair(mut self) -> Self {
        self.require_valid_pair = true;
        self
    }

    pub fn presence_wins(mut self) -> Self {
        self.presence_wins = true;
        self
    }

    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn display(mut self, display: DisplayFormatter) -> Self {
        self.display = Some(display);
        self
    }

    pub fn fallback_for(mut self, key: &str) -> Self {
        self.fallback_for = Some(key.to_string());
        self
    }

    pub fn headline(mut self, headline: &str) -> Self {
        self.headline = Some(headline.to_string());
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    Normalizer,
    DisplayFormatter,
}

/// A function name the registry referenced but nothing provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationGap {
    pub key: String,
    pub kind: GapKind,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Registry {
    /// Sorted by `(priority, key)`; this is the evaluation order.
    attributes: Vec<AttributeDefinition>,
    index: BTreeMap<String, usize>,
    parent: BTreeMap<String, String>,
    settings: EngineSettings,
    gaps: Vec<ConfigurationGap>,
}

impl Registry {
    /// Validate and order a set of definitions.
    pub fn new(
        settings: EngineSettings,
        mut attributes: Vec<AttributeDefinition>,
    ) -> Result<Self, RegistryError> {
        check_threshold("engine.percentage_threshold", Some(settings.percentage_threshold))?;
        if settings.feature_list_limit == 0 {
            return Err(RegistryError::ZeroSetting {
                setting: "feature_list_limit",
            });
        }

        attributes.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.key.cmp(&b.key)));

        let mut index = BTreeMap::new();
        for (i, def) in attributes.iter().enumerate() {
            if index.insert(def.key.clone(), i).is_some() {
                return Err(RegistryError::DuplicateKey {
                    key: def.key.clone(),
                });
            }
            if let ComparisonMode::Ranking(r) = &def.mode {
                if r.is_empty() {
                    return Err(RegistryError::EmptyRanking {
                        key: def.key.clone(),
                    });
                }
            }
            check_threshold(&def.key, def.min_diff)?;
            check_threshold(&def.key, def.percentage_threshold)?;
        }

        let mut parent: BTreeMap<String, String> = BTreeMap::new();
        for (pos, def) in attributes.iter().enumerate() {
            let Some(composite) = &def.composite else {
                continue;
            };
            check_threshold(&def.key, Some(composite.score_diff_threshold))?;
            match composite.format {
                CompositeFormat::Consolidated if composite.score_key.is_none() => {
                    return Err(RegistryError::MissingScoreKey {
                        composite: def.key.clone(),
                    });
                }
                CompositeFormat::Portability if composite.children.len() != 2 => {
                    return Err(RegistryError::PortabilityArity {
                        composite: def.key.clone(),
                        count: composite.children.len(),
                    });
                }
                _ => {}
            }
            for child in &composite.children {
                let Some(&child_pos) = index.get(child) else {
                    return Err(RegistryError::UnknownChild {
                        composite: def.key.clone(),
                        child: child.clone(),
                    });
                };
                if child_pos <= pos {
                    return Err(RegistryError::ChildBeforeComposite {
                        composite: def.key.clone(),
                        child: child.clone(),
                    });
                }
                if let Some(first) = parent.insert(child.clone(), def.key.clone()) {
                    return Err(RegistryError::ChildInMultipleComposites {
                        child: child.clone(),
                        first,
                        second: def.key.clone(),
                    });
                }
            }
        }

        for (pos, def) in attributes.iter().enumerate() {
            let Some(fallback) = &def.fallback_for else {
                continue;
            };
            match index.get(fallback) {
                None => {
                    return Err(RegistryError::UnknownFallback {
                        key: def.key.clone(),
                        fallback: fallback.clone(),
                    });
                }
                Some(&target) if target >= pos => {
                    return Err(RegistryError::FallbackOrder {
                        key: def.key.clone(),
                        fallback: fallback.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            attributes,
            index,
            parent,
            settings,
            gaps: Vec::new(),
        })
    }

    /// Build from the on-disk schema, resolving function names.
    pub fn from_file(file: RegistryFile) -> Result<Self, RegistryError> {
        let mut gaps = Vec::new();
        let mut attributes = Vec::with_capacity(file.attributes.len());
        for entry in file.attributes {
            attributes.push(definition_from_entry(entry, &mut gaps)?);
        }
        let mut registry = Self::new(file.engine, attributes)?;
        registry.gaps = gaps;
        Ok(registry)
    }

    /// Definitions in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeDefinition> {
        self.index.get(key).map(|&i| &self.attributes[i])
    }

    /// Key of the composite that owns `child`, if any.
    pub fn composite_of(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(String::as_str)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn gaps(&self) -> &[ConfigurationGap] {
        &self.gaps
    }
}

fn check_threshold(key: &str, value: Option<f64>) -> Result<(), RegistryError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(RegistryError::InvalidThreshold {
            key: key.to_string(),
            value: v,
        }),
        _ => Ok(()),
    }
}

fn definition_from_entry(
    entry: AttributeEntry,
    gaps: &mut Vec<ConfigurationGap>,
) -> Result<AttributeDefinition, RegistryError> {
    let mode = match (entry.higher_is_better, &entry.ranking) {
        (Some(_), Some(_)) => {
            return Err(RegistryError::ConflictingModes { key: entry.key });
        }
        (Some(true), None) => ComparisonMode::Numeric(Direction::Higher),
        (Some(false), None) => ComparisonMode::Numeric(Direction::Lower),
        (None, Some(ranking)) => ComparisonMode::Ranking(
            ranking.iter().map(|r| r.trim().to_lowercase()).collect(),
        ),
        (None, None) => ComparisonMode::Unranked,
    };

    let normalizer = entry.normalizer.as_deref().and_then(|name| {
        let found = specvs_normalize::lookup(name);
        if found.is_none() {
            warn!(key = %entry.key, normalizer = name, "unknown normalizer; comparing raw values");
            gaps.push(ConfigurationGap {
                key: entry.key.clone(),
                kind: GapKind::Normalizer,
                name: name.to_string(),
            });
        }
        found
    });

    let display = entry.display_formatter.as_deref().and_then(|name| {
        let found = specvs_normalize::display::lookup(name);
        if found.is_none() {
            warn!(key = %entry.key, formatter = name, "unknown display formatter; showing raw values");
            gaps.push(ConfigurationGap {
                key: entry.key.clone(),
                kind: GapKind::DisplayFormatter,
                name: name.to_string(),
            });
        }
        found
    });

    Ok(AttributeDefinition {
        key: entry.key,
        label: entry.label,
        unit: entry.unit,
        mode,
        diff_format: entry.diff_format,
        min_diff: entry.min_diff,
        percentage_threshold: entry.percentage_threshold,
        require_valid_pair: entry.require_valid_pair,
        presence_wins: entry.presence_wins,
        normalizer,
        display,
        fallback_for: entry.fallback_for,
        priority: entry.priority,
        tooltip: entry.tooltip,
        headline: entry.headline,
        composite: entry.composite.map(composite_from_entry),
    })
}

fn composite_from_entry(entry: CompositeEntry) -> CompositeDefinition {
    CompositeDefinition {
        children: entry.children,
        score_key: entry.score_key,
        score_diff_threshold: entry.score_diff_threshold,
        format: entry.format,
        max_items: entry.max_items,
    }
}
