use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use smol_str::SmolStr;

use crate::{
    error::ExtractError,
    shader_list::{ShaderEntry, ShaderStage},
};

static PS_NAME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_ps(\d+\w?)$").unwrap());
static VS_NAME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_vs(\d+\w?)$").unwrap());
static PS_LINE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[ps\d+\w?\]").unwrap());
static VS_LINE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[vs\d+\w?\]").unwrap());
static DEFAULT_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".*\[=([^\]]+)\]").unwrap());
static BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]").unwrap());
static STATIC_COMBO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*//\s*STATIC\s*:\s*"(.*)"\s+"([^"]*)""#).unwrap());
static DYNAMIC_COMBO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*//\s*DYNAMIC\s*:\s*"(.*)"\s+"([^"]*)""#).unwrap());
static SKIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*//\s*SKIP\s*:\s*(.*)$").unwrap());
static CENTROID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*//\s*CENTROID\s*:\s*TEXCOORD(\d+)$").unwrap());
static COMBO_RANGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\.(\d+)$").unwrap());

/// A named variation axis with an inclusive value range.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Combo {
    pub name: SmolStr,
    pub min: u32,
    pub max: u32,
}

impl Combo {
    /// The number of values the combo can take.
    pub fn width(&self) -> u64 {
        u64::from(self.max - self.min) + 1
    }
}

/// Opaque boolean expressions naming combo tuples excluded from compilation.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SkipSet {
    pub expressions: Vec<String>,
}

impl SkipSet {
    /// All skips joined into one disjunction like `($A && $B)||($C)||0`.
    ///
    /// The trailing 0 keeps the expression well formed when no skips exist.
    pub fn combined(&self) -> String {
        let mut combined = String::new();
        for expression in &self.expressions {
            combined += &format!("({expression})||");
        }
        combined + "0"
    }
}

/// Every variation axis extracted from one shader's annotated source.
///
/// A descriptor is created once per canonical shader name and not modified
/// afterwards, so shaders can be prepared independently.
#[derive(Debug, PartialEq, Clone)]
pub struct ShaderDescriptor {
    /// The canonical output name like `water_ps20b`.
    pub name: String,
    /// The file name compiled for this shader.
    pub source_file: String,
    pub stage: ShaderStage,
    pub static_combos: Vec<Combo>,
    pub dynamic_combos: Vec<Combo>,
    /// The `[=VALUE]` initializer for each static combo, `None` when unset.
    pub defaults: IndexMap<SmolStr, Option<String>>,
    pub skips: SkipSet,
    /// Bit `k` set means interpolant `TEXCOORD<k>` is centroid sampled.
    pub centroid_mask: u32,
}

impl ShaderDescriptor {
    /// A descriptor with no combos for stages without annotation support.
    pub fn new(entry: &ShaderEntry) -> Self {
        Self {
            name: entry.name.clone(),
            source_file: entry.file_name().to_string(),
            stage: entry.stage,
            static_combos: Vec::new(),
            dynamic_combos: Vec::new(),
            defaults: IndexMap::new(),
            skips: SkipSet::default(),
            centroid_mask: 0,
        }
    }

    /// Extract combo annotations from flattened source lines.
    ///
    /// Lines apply in source order with version filtering first. A line
    /// tagged for a different shader model is dropped before any annotation
    /// on it is matched, so the same source can declare different combos for
    /// each model it expands to.
    pub fn from_lines(entry: &ShaderEntry, lines: &[String]) -> Result<Self, ExtractError> {
        let mut descriptor = Self::new(entry);

        // Version guards compare bracket tags against the name's own suffix.
        let name = entry.name.to_lowercase();
        let ps_tag = PS_NAME_SUFFIX
            .captures(&name)
            .map(|c| format!("[ps{}]", &c[1]));
        let vs_tag = VS_NAME_SUFFIX
            .captures(&name)
            .map(|c| format!("[vs{}]", &c[1]));

        for line in lines {
            if line.trim().is_empty() || line.contains("[XBOX]") {
                continue;
            }

            let lowered = line.to_lowercase();
            if mismatched_version(&lowered, ps_tag.as_deref(), &PS_LINE_TAG)
                || mismatched_version(&lowered, vs_tag.as_deref(), &VS_LINE_TAG)
            {
                continue;
            }

            // The last [=VALUE] bracket on the line is the combo's initializer.
            let default = DEFAULT_VALUE.captures(line).map(|c| c[1].to_string());
            let line = BRACKET.replace_all(line, "");

            if let Some(captures) = STATIC_COMBO.captures(&line) {
                let combo = parse_combo(&captures[1], &captures[2])?;
                if descriptor
                    .defaults
                    .insert(combo.name.clone(), default)
                    .is_some()
                {
                    return Err(ExtractError::DuplicateStatic {
                        name: combo.name.to_string(),
                    });
                }
                descriptor.static_combos.push(combo);
            } else if let Some(captures) = DYNAMIC_COMBO.captures(&line) {
                let combo = parse_combo(&captures[1], &captures[2])?;
                if descriptor
                    .dynamic_combos
                    .iter()
                    .any(|c| c.name == combo.name)
                {
                    return Err(ExtractError::DuplicateDynamic {
                        name: combo.name.to_string(),
                    });
                }
                descriptor.dynamic_combos.push(combo);
            } else if let Some(captures) = SKIP.captures(&line) {
                descriptor
                    .skips
                    .expressions
                    .push(captures[1].trim().to_string());
            } else if let Some(captures) = CENTROID.captures(&line) {
                let index: u32 = captures[1]
                    .parse()
                    .ok()
                    .filter(|i| *i < u32::BITS)
                    .ok_or_else(|| ExtractError::CentroidOutOfRange {
                        index: captures[1].to_string(),
                    })?;
                descriptor.centroid_mask |= 1 << index;
            }
        }

        Ok(descriptor)
    }

    /// The `[=VALUE]` initializer recorded for a static combo.
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.defaults.get(name).and_then(|value| value.as_deref())
    }
}

fn mismatched_version(lowered: &str, tag: Option<&str>, line_tag: &Regex) -> bool {
    tag.is_some_and(|tag| line_tag.is_match(lowered) && !lowered.contains(tag))
}

fn parse_combo(name: &str, range: &str) -> Result<Combo, ExtractError> {
    COMBO_RANGE
        .captures(range)
        .and_then(|captures| {
            let min = captures[1].parse().ok()?;
            let max = captures[2].parse().ok()?;
            (min <= max).then(|| Combo {
                name: name.into(),
                min,
                max,
            })
        })
        .ok_or_else(|| ExtractError::MalformedRange {
            name: name.to_string(),
            range: range.to_string(),
        })
}
