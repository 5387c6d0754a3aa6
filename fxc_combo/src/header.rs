//! Generation of the C++ `.inc` index headers included by shader DLL code.
//!
//! Each header declares a `<name>_Static_Index` and a `<name>_Dynamic_Index`
//! class with range checked setters and a `GetIndex` method whose scale
//! constants mirror [IndexLayout](crate::index::IndexLayout). Output is byte
//! stable so regenerating unchanged shaders never dirties the build.

use crate::{
    annotation::{Combo, ShaderDescriptor},
    error::ProfileError,
    index::IndexLayout,
    shader_list::ShaderModel,
};

/// The full `.inc` file body: the static holder, then the dynamic holder.
pub fn include_header(
    descriptor: &ShaderDescriptor,
    layout: &IndexLayout,
    debug: bool,
) -> Result<String, ProfileError> {
    Ok(format!(
        "{}\n\n{}",
        static_index_header(descriptor, layout, debug)?,
        dynamic_index_header(descriptor, layout, debug)?
    ))
}

/// The `<name>_Static_Index` class for combos fixed at material load.
///
/// With `debug` the class carries `m_b` guard members under `#ifdef _DEBUG`
/// that assert every combo without an initializer is set before use.
pub fn static_index_header(
    descriptor: &ShaderDescriptor,
    layout: &IndexLayout,
    debug: bool,
) -> Result<String, ProfileError> {
    let model = ShaderModel::from_shader_name(&descriptor.name)?;
    let class_name = format!("{}_Static_Index", descriptor.name);

    let mut out = String::from("#include \"shaderlib/cshader.h\"\n\n");
    out += &format!("#define shaderStaticTest_{} (", descriptor.name);
    for combo in &descriptor.static_combos {
        if descriptor.default_value(&combo.name).is_none() {
            out += &format!("{}forgot_to_set_static_{} + ", sentinel_prefix(model), combo.name);
        }
    }
    out += "0)\n";

    out += &format!("\nclass {class_name}\n{{\npublic:\n");

    out += &format!("\t{class_name}( void )\n\t{{\n");
    for combo in &descriptor.static_combos {
        let value = descriptor.default_value(&combo.name).unwrap_or("0");
        out += &format!("\t\tm_n{} = {value};\n", combo.name);
    }
    if debug {
        out += "#ifdef _DEBUG\n";
        for combo in &descriptor.static_combos {
            let defined = descriptor.default_value(&combo.name).is_some();
            out += &format!("\t\tm_b{} = {defined};\n", combo.name);
        }
        out += "#endif\t// _DEBUG\n";
    }
    out += "\t}\n\n";

    out += &get_index(&descriptor.static_combos, &layout.static_scales, "Static", debug);

    for combo in &descriptor.static_combos {
        out += &setter_pair(combo, debug);
    }

    out += &members(&descriptor.static_combos, debug);

    Ok(out)
}

/// The `<name>_Dynamic_Index` class for combos selected per draw call.
pub fn dynamic_index_header(
    descriptor: &ShaderDescriptor,
    layout: &IndexLayout,
    debug: bool,
) -> Result<String, ProfileError> {
    let model = ShaderModel::from_shader_name(&descriptor.name)?;
    let class_name = format!("{}_Dynamic_Index", descriptor.name);

    let mut out = format!("#define shaderDynamicTest_{} (", descriptor.name);
    for combo in &descriptor.dynamic_combos {
        out += &format!("{}forgot_to_set_dynamic_{} + ", sentinel_prefix(model), combo.name);
    }
    out += "0)\n";

    out += &format!("\nclass {class_name}\n{{\npublic:\n");

    out += &format!("\t{class_name}( void )\n\t{{\n");
    for combo in &descriptor.dynamic_combos {
        out += &format!("\t\tm_n{} = 0;\n", combo.name);
    }
    if debug {
        out += "#ifdef _DEBUG\n";
        for combo in &descriptor.dynamic_combos {
            out += &format!("\t\tm_b{} = false;\n", combo.name);
        }
        out += "#endif\t// _DEBUG\n";
    }
    out += "\t}\n\n";

    out += &get_index(&descriptor.dynamic_combos, &layout.dynamic_scales, "Dynamic", debug);

    for combo in &descriptor.dynamic_combos {
        out += &setter_pair(combo, debug);
    }

    out += &members(&descriptor.dynamic_combos, debug);

    Ok(out)
}

fn sentinel_prefix(model: ShaderModel) -> &'static str {
    if model.is_vertex() { "vsh_" } else { "psh_" }
}

fn get_index(combos: &[Combo], scales: &[u64], kind: &str, debug: bool) -> String {
    let mut out = String::from("\tint GetIndex( void )\n\t{\n");
    out += "\t\t// Asserts to make sure that we aren't using any skipped combinations.\n";
    if debug {
        out += "\n#ifdef _DEBUG\n";
        out += "\t\t// Asserts to make sure that we are setting all of the combination vars.\n";
        if !combos.is_empty() {
            let all_defined = combos
                .iter()
                .map(|combo| format!("m_b{}", combo.name))
                .collect::<Vec<_>>()
                .join(" && ");
            out += &format!("\t\tbool bAll{kind}VarsDefined = {all_defined};\n");
            out += &format!("\t\tAssert( bAll{kind}VarsDefined );\n");
        }
        out += "#endif\t// _DEBUG\n";
    }
    out += "\n\t\treturn ";
    for (combo, scale) in combos.iter().zip(scales) {
        out += &format!("( 0x{scale:X} * m_n{} ) + ", combo.name);
    }
    out += "0;\n\t}\n\n";
    out
}

fn setter_pair(combo: &Combo, debug: bool) -> String {
    let mut out = format!("\tvoid Set{}( int i )\n\t{{\n", combo.name);
    out += &format!("\t\tAssert( i >= {} && i <= {} );\n", combo.min, combo.max);
    out += &format!("\t\tm_n{} = i;\n", combo.name);
    out += &debug_mark(combo, debug);
    out += "\t}\n\n";

    out += &format!("\tvoid Set{}( bool i )\n\t{{\n", combo.name);
    out += &format!("\t\tm_n{} = i ? 1 : 0;\n", combo.name);
    out += &debug_mark(combo, debug);
    out += "\t}\n\n";
    out
}

fn debug_mark(combo: &Combo, debug: bool) -> String {
    if debug {
        format!("#ifdef _DEBUG\n\t\tm_b{} = true;\n#endif\t// _DEBUG\n", combo.name)
    } else {
        String::new()
    }
}

fn members(combos: &[Combo], debug: bool) -> String {
    let mut out = String::from("private:\n");
    for combo in combos {
        out += &format!("\t int m_n{};\n", combo.name);
    }
    if debug {
        out += "#ifdef _DEBUG\n";
        for combo in combos {
            out += &format!("\t bool m_b{};\n", combo.name);
        }
        out += "#endif\t// _DEBUG\n";
    }
    out += "};\n";
    out
}
