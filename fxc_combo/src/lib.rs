//! # fxc_combo
//! A library for preparing annotated HLSL shaders for batch compilation.
//!
//! Shader sources declare their build time and run time variations with
//! comments like `// STATIC: "FOO" "0..2"`. Each assignment of combo values
//! maps to a linear index in a mixed radix encoding with dynamic combos in
//! the low order digits. Preparing a shader flattens its includes, extracts
//! the combo annotations, and renders the C++ `.inc` index header and the
//! manifest record consumed by the external compiler. The generated
//! `GetIndex` and the manifest counts come from the same
//! [IndexLayout](crate::index::IndexLayout), so engine side selection and
//! batch compilation always agree.

use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;

use crate::{
    annotation::ShaderDescriptor, error::PrepareError, header::include_header,
    index::IndexLayout, manifest::ManifestRecord, shader_list::ShaderEntry, source::read_source,
};

pub mod annotation;
pub mod error;
pub mod header;
pub mod index;
pub mod manifest;
pub mod shader_list;
pub mod source;

/// Everything produced for one shader list entry.
#[derive(Debug, PartialEq, Clone)]
pub struct PreparedShader {
    pub descriptor: ShaderDescriptor,
    /// The `.inc` header body, `None` for stages without combo tracking.
    pub header: Option<String>,
    /// The compile job to append to the manifest, `None` when not compiling.
    pub manifest_record: Option<ManifestRecord>,
    /// Files the source pulls in with `#include`, in first use order.
    pub dependencies: Vec<PathBuf>,
}

/// Settings shared by every shader in one build.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PrepOptions {
    /// Emit compile jobs. Header only builds set this to false.
    pub compile: bool,
    /// Emit the `#ifdef _DEBUG` guard sections of generated headers.
    pub debug_headers: bool,
}

impl Default for PrepOptions {
    fn default() -> Self {
        Self {
            compile: true,
            debug_headers: true,
        }
    }
}

/// Prepare one shader: flatten its source, extract combos, and render the
/// header and manifest record its stage and the options ask for.
pub fn prepare_shader(
    source_dir: &Path,
    entry: &ShaderEntry,
    options: PrepOptions,
) -> Result<PreparedShader, PrepareError> {
    let source = read_source(source_dir.join(&entry.source_file))?;

    if !entry.stage.tracks_combos() {
        return Ok(PreparedShader {
            descriptor: ShaderDescriptor::new(entry),
            header: None,
            manifest_record: None,
            dependencies: source.includes,
        });
    }

    let descriptor = ShaderDescriptor::from_lines(entry, &source.lines)?;
    let layout = IndexLayout::new(&descriptor.static_combos, &descriptor.dynamic_combos)?;
    debug!(
        "{}: {} static and {} dynamic combos, {} total combinations",
        descriptor.name,
        descriptor.static_combos.len(),
        descriptor.dynamic_combos.len(),
        layout.total_combos
    );

    let header = entry
        .stage
        .emits_header()
        .then(|| include_header(&descriptor, &layout, options.debug_headers))
        .transpose()?;
    let manifest_record = options
        .compile
        .then(|| ManifestRecord::new(&descriptor, &layout))
        .transpose()?;

    Ok(PreparedShader {
        descriptor,
        header,
        manifest_record,
        dependencies: source.includes,
    })
}

/// Prepare every shader in the list, preserving list order in the result.
///
/// Shaders never depend on each other's output, so they are prepared in
/// parallel. The first error aborts the build.
pub fn prepare_shaders(
    source_dir: &Path,
    entries: &[ShaderEntry],
    options: PrepOptions,
) -> Result<Vec<PreparedShader>, PrepareError> {
    entries
        .par_iter()
        .map(|entry| prepare_shader(source_dir, entry, options))
        .collect()
}
