use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use fxc_combo::{
    PrepOptions, PreparedShader, prepare_shaders,
    shader_list::{ShaderEntry, load_shader_list},
};
use log::{info, warn};

const COMPILE_TEMP: &str = "compile_temp";
const FILELIST: &str = "compile_temp/filelist.txt";

/// Prepare annotated shaders and drive the external compile.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of a text file listing the shaders to build, without the .txt extension.
    #[arg(long)]
    shaders: String,

    /// The game directory containing gameinfo.txt.
    #[arg(long)]
    game: String,

    /// The root SDK directory.
    #[arg(long)]
    source: String,

    /// The directory containing shadercompile.exe.
    #[arg(long)]
    bin_dir: String,

    /// Stage the shader model 3.0 compiler next to the sources.
    #[arg(long)]
    dx9_30: bool,

    /// Rewrite legacy version suffixes to shader model 3.0.
    #[arg(long)]
    force30: bool,

    /// Only generate .inc index headers without compiling anything.
    #[arg(long)]
    dynamic: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let start = std::time::Instant::now();

    setup_dirs().context("failed to create the build directories")?;

    let game_dir = std::path::absolute(&cli.game)?;
    let bin_dir = std::path::absolute(&cli.bin_dir)?;
    let source_dir = std::path::absolute(&cli.source)?;

    let list_path = format!("{}.txt", cli.shaders);
    let entries = load_shader_list(&list_path, cli.force30)?;
    info!("preparing {} shaders from {list_path}", entries.len());

    let options = PrepOptions {
        compile: !cli.dynamic,
        debug_headers: true,
    };
    let prepared = prepare_shaders(Path::new("."), &entries, options)?;

    for shader in &prepared {
        if let Some(header) = &shader.header {
            let path = Path::new("include").join(format!("{}.inc", shader.descriptor.name));
            std::fs::write(&path, header)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }

    write_manifest(&prepared)?;

    if cli.dynamic || prepared.iter().all(|s| s.manifest_record.is_none()) {
        println!("Finished in {:?}", start.elapsed());
        return Ok(());
    }

    stage_compile_files(&entries, &prepared, cli.dx9_30, &source_dir, &bin_dir)?;
    run_compiler(&bin_dir, &game_dir)?;
    publish_shaders(&game_dir)?;

    println!("Finished in {:?}", start.elapsed());
    Ok(())
}

/// Create the staging layout the external compiler expects and drop any
/// manifest left over from an earlier run.
fn setup_dirs() -> std::io::Result<()> {
    for dir in [
        "compile_temp/shaders/fxc",
        "compile_temp/shaders/vsh",
        "compile_temp/shaders/psh",
        "include",
    ] {
        std::fs::create_dir_all(dir)?;
    }

    match std::fs::remove_file(FILELIST) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Append every compile job to `filelist.txt` in shader list order.
fn write_manifest(prepared: &[PreparedShader]) -> anyhow::Result<()> {
    let records: Vec<_> = prepared
        .iter()
        .filter_map(|shader| shader.manifest_record.as_ref())
        .collect();
    if records.is_empty() {
        return Ok(());
    }

    let mut filelist = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(FILELIST)
        .context("failed to open the build manifest")?;
    for record in records {
        filelist.write_all(record.render().as_bytes())?;
    }
    Ok(())
}

/// Copy every compiled source and its includes flat into the staging
/// directory and record the unique file names for the compile farm.
fn stage_compile_files(
    entries: &[ShaderEntry],
    prepared: &[PreparedShader],
    dx9_30: bool,
    source_dir: &Path,
    bin_dir: &Path,
) -> anyhow::Result<()> {
    // Legacy stages have no compile jobs but their sources still stage for
    // the older vsh and psh tools.
    let mut files = Vec::new();
    for (entry, shader) in entries.iter().zip(prepared) {
        let source = PathBuf::from(&entry.source_file);
        if !files.contains(&source) {
            files.push(source);
        }
        for dependency in &shader.dependencies {
            if !files.contains(dependency) {
                files.push(dependency.clone());
            }
        }
    }

    let mut unique = String::new();
    for file in &files {
        let name = file
            .file_name()
            .with_context(|| format!("{} has no file name", file.display()))?;
        unique += &format!("{}\n", name.to_string_lossy());
        std::fs::copy(file, Path::new(COMPILE_TEMP).join(name))
            .with_context(|| format!("failed to stage {}", file.display()))?;
    }
    if dx9_30 {
        for extra in [
            source_dir.join("devtools/bin/d3dx9_33.dll"),
            source_dir.join("dx10sdk/utilities/dx9_30/dx_proxy.dll"),
            bin_dir.join("shadercompile.exe"),
            bin_dir.join("shadercompile_dll.dll"),
            bin_dir.join("vstdlib.dll"),
            bin_dir.join("tier0.dll"),
        ] {
            unique += &format!("{}\n", extra.display());
        }
    }
    std::fs::write("compile_temp/uniquefilestocopy.txt", unique)?;
    Ok(())
}

fn run_compiler(bin_dir: &Path, game_dir: &Path) -> anyhow::Result<()> {
    let shader_path = std::path::absolute(COMPILE_TEMP)?;
    let threads = compile_threads();

    println!(
        "shadercompile.exe -nompi -nop4 -allowdebug -shaderpath \"{}\" -game \"{}\" -threads {threads}",
        shader_path.display(),
        game_dir.display()
    );

    let status = std::process::Command::new(bin_dir.join("shadercompile.exe"))
        .current_dir(bin_dir)
        .args(["-nompi", "-nop4", "-allowdebug", "-shaderpath"])
        .arg(&shader_path)
        .arg("-game")
        .arg(game_dir)
        .arg("-threads")
        .arg(threads.to_string())
        .status()
        .context("failed to run shadercompile.exe")?;
    if !status.success() {
        // A failed run can still leave publishable shaders behind.
        warn!("shadercompile.exe exited with {status}");
    }
    Ok(())
}

fn compile_threads() -> usize {
    // Leave two cores for the rest of the machine.
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cpus.saturating_sub(2).max(1)
}

/// Copy the compiled shader tree into the game directory.
fn publish_shaders(game_dir: &Path) -> anyhow::Result<()> {
    let compiled = Path::new("compile_temp/shaders");
    let publish_dir = game_dir.join("shaders");

    for entry in globwalk::GlobWalkerBuilder::from_patterns(compiled, &["*"]).build()? {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(compiled)?;
        let target = publish_dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target)
            .with_context(|| format!("failed to publish {}", relative.display()))?;
    }
    Ok(())
}
