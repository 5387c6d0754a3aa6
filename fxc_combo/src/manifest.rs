use crate::{
    annotation::{Combo, ShaderDescriptor},
    error::ProfileError,
    index::IndexLayout,
    shader_list::ShaderModel,
};

/// One compile job for the external shader compiler.
///
/// Records append to the shared `filelist.txt` manifest in shader list order.
#[derive(Debug, PartialEq, Clone)]
pub struct ManifestRecord {
    pub name: String,
    /// The staged file name the compile command references.
    pub source_file: String,
    pub static_combos: Vec<Combo>,
    pub dynamic_combos: Vec<Combo>,
    /// The combined skip disjunction, `"0"` when the shader has no skips.
    pub skip_code: String,
    pub centroid_mask: u32,
    pub total_combos: u64,
    pub total_dynamic_combos: u64,
    pub model: ShaderModel,
}

impl ManifestRecord {
    pub fn new(
        descriptor: &ShaderDescriptor,
        layout: &IndexLayout,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            name: descriptor.name.clone(),
            source_file: descriptor.source_file.clone(),
            static_combos: descriptor.static_combos.clone(),
            dynamic_combos: descriptor.dynamic_combos.clone(),
            skip_code: descriptor.skips.combined(),
            centroid_mask: descriptor.centroid_mask,
            total_combos: layout.total_combos,
            total_dynamic_combos: layout.total_dynamic_combos,
            model: ShaderModel::from_shader_name(&descriptor.name)?,
        })
    }

    /// Render the record between its `#BEGIN` and `#END` markers.
    pub fn render(&self) -> String {
        let mut out = format!("#BEGIN {}\n", self.name);
        out += &format!("{}\n", self.source_file);
        out += "#DEFINES-D:\n";
        for combo in &self.dynamic_combos {
            out += &format!("{}={}..{}\n", combo.name, combo.min, combo.max);
        }
        out += "#DEFINES-S:\n";
        for combo in &self.static_combos {
            out += &format!("{}={}..{}\n", combo.name, combo.min, combo.max);
        }
        out += &format!("#SKIPS:\n{}\n", self.skip_code);
        out += "#COMMAND:\n";
        out += &format!(
            "fxc.exe /DTOTALSHADERCOMBOS={} /DCENTROIDMASK={} /DNUMDYNAMICCOMBOS={} /DFLAGS=0x0\n",
            self.total_combos, self.centroid_mask, self.total_dynamic_combos
        );
        out += &format!(
            "/Dmain=main /Emain /T{} /DSHADER_MODEL_{}=1 /nologo /Foshader.o {}>output.txt 2>&1 \n",
            self.model.profile(),
            self.model.profile().to_uppercase(),
            self.source_file
        );
        out += "#END\n";
        out
    }
}
