use std::path::Path;

use crate::error::{ListError, ProfileError};

/// The shader pipeline families handled by the build.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShaderStage {
    /// Annotated HLSL compiled by the external compiler (.fxc).
    Fxc,
    /// Handwritten vertex shader assembly (.vsh).
    LegacyVertex,
    /// Handwritten pixel shader assembly (.psh).
    LegacyPixel,
}

impl ShaderStage {
    /// Whether combo annotations are extracted and indexed for this stage.
    pub fn tracks_combos(&self) -> bool {
        matches!(self, ShaderStage::Fxc)
    }

    /// Whether the build writes an index header for this stage.
    ///
    /// Legacy vertex shaders keep the flag for parity with older tooling,
    /// but only a stage that tracks combos has a header to write.
    pub fn emits_header(&self) -> bool {
        !matches!(self, ShaderStage::LegacyPixel)
    }

    fn from_list_line(line: &str) -> Option<(Self, &'static str)> {
        [
            (ShaderStage::Fxc, ".fxc"),
            (ShaderStage::LegacyVertex, ".vsh"),
            (ShaderStage::LegacyPixel, ".psh"),
        ]
        .into_iter()
        .find(|(_, extension)| line.contains(extension))
    }
}

/// One shader to prepare, produced from a line of the shader list.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ShaderEntry {
    /// The source file referenced by the list, relative to the project directory.
    pub source_file: String,
    /// The canonical output name after version folding, from the file name
    /// alone.
    pub name: String,
    pub stage: ShaderStage,
}

impl ShaderEntry {
    /// The file name component without any leading directories.
    ///
    /// Sources are staged flat next to the compiler, so generated compile
    /// commands reference shaders by file name alone.
    pub fn file_name(&self) -> &str {
        base_name(&self.source_file)
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Load a shader list with one source file per line.
///
/// `//` starts a comment and blank lines are ignored. Every remaining line
/// must reference a `.fxc`, `.vsh`, or `.psh` file.
///
/// Version suffixes fold at load time. With `force30` each legacy suffix
/// rewrites to its shader model 3.0 equivalent. Otherwise an ambiguous suffix
/// expands to one entry per model it targets, so a single list line can
/// produce multiple independently indexed shaders.
pub fn load_shader_list<P: AsRef<Path>>(
    path: P,
    force30: bool,
) -> Result<Vec<ShaderEntry>, ListError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ListError::Io {
        path: path.to_owned(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let content = match line.find("//") {
            Some(comment) => &line[..comment],
            None => line,
        };
        let content = content.trim().to_lowercase();
        if content.is_empty() {
            continue;
        }

        let Some((stage, extension)) = ShaderStage::from_list_line(&content) else {
            return Err(ListError::UnrecognizedEntry {
                path: path.to_owned(),
                line: i + 1,
                text: content,
            });
        };

        // Directory components never reach the canonical name.
        let base = content.replace(extension, "");
        for name in fold_versions(base_name(&base), force30) {
            entries.push(ShaderEntry {
                source_file: content.clone(),
                name,
                stage,
            });
        }
    }

    Ok(entries)
}

/// Expand or rewrite legacy version suffixes in a shader base name.
fn fold_versions(base: &str, force30: bool) -> Vec<String> {
    if force30 {
        // The replacement order matters: _ps20b must fold before _ps20.
        vec![
            base.replace("_ps2x", "_ps30")
                .replace("_ps20b", "_ps30")
                .replace("_ps20", "_ps30")
                .replace("_vs20", "_vs30")
                .replace("_vsxx", "_vs30"),
        ]
    } else if base.contains("_ps2x") {
        vec![
            base.replace("_ps2x", "_ps20"),
            base.replace("_ps2x", "_ps20b"),
        ]
    } else if base.contains("_vsxx") {
        vec![
            base.replace("_vsxx", "_vs11"),
            base.replace("_vsxx", "_vs20"),
        ]
    } else {
        vec![base.to_string()]
    }
}

/// A Direct3D target profile inferred from the canonical shader name.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShaderModel {
    Ps30,
    Ps2B,
    Ps20,
    Ps14,
    Ps11,
    Vs30,
    Vs2B,
    Vs20,
    Vs14,
    Vs11,
}

impl ShaderModel {
    /// Infer the profile by substring match in fixed priority order.
    ///
    /// `_ps2x` expansion produces names like `water_ps20b` that only the
    /// `ps20` rule matches, so they compile as `ps_2_0` rather than `ps_2_b`.
    pub fn from_shader_name(name: &str) -> Result<Self, ProfileError> {
        [
            ("ps30", ShaderModel::Ps30),
            ("ps2b", ShaderModel::Ps2B),
            ("ps20", ShaderModel::Ps20),
            ("ps14", ShaderModel::Ps14),
            ("ps11", ShaderModel::Ps11),
            ("vs30", ShaderModel::Vs30),
            ("vs2b", ShaderModel::Vs2B),
            ("vs20", ShaderModel::Vs20),
            ("vs14", ShaderModel::Vs14),
            ("vs11", ShaderModel::Vs11),
        ]
        .into_iter()
        .find_map(|(suffix, model)| name.contains(suffix).then_some(model))
        .ok_or_else(|| ProfileError::UnrecognizedSuffix {
            name: name.to_string(),
        })
    }

    /// The profile string passed to the compiler with `/T`.
    pub fn profile(&self) -> &'static str {
        match self {
            ShaderModel::Ps30 => "ps_3_0",
            ShaderModel::Ps2B => "ps_2_b",
            ShaderModel::Ps20 => "ps_2_0",
            ShaderModel::Ps14 => "ps_1_4",
            ShaderModel::Ps11 => "ps_1_1",
            ShaderModel::Vs30 => "vs_3_0",
            ShaderModel::Vs2B => "vs_2_b",
            ShaderModel::Vs20 => "vs_2_0",
            ShaderModel::Vs14 | ShaderModel::Vs11 => "vs_1_1",
        }
    }

    pub fn is_vertex(&self) -> bool {
        matches!(
            self,
            ShaderModel::Vs30
                | ShaderModel::Vs2B
                | ShaderModel::Vs20
                | ShaderModel::Vs14
                | ShaderModel::Vs11
        )
    }
}
