use glob::glob;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const SHADER_SRC_DIR: &str = "shaders";

#[cfg(target_os = "windows")]
const GLSL_COMPILER_NAME: &str = "glslc.exe";
#[cfg(not(target_os = "windows"))]
const GLSL_COMPILER_NAME: &str = "glslc";

/// `glslc` from `$VULKAN_SDK/bin`, falling back to the first hit on `PATH`.
fn find_compiler() -> Option<PathBuf> {
    let sdk = env::var_os("VULKAN_SDK").map(|sdk| PathBuf::from(sdk).join("bin"));
    let path = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect::<Vec<_>>())
        .unwrap_or_default();

    sdk.into_iter()
        .chain(path)
        .map(|dir| dir.join(GLSL_COMPILER_NAME))
        .find(|candidate| candidate.is_file())
}

fn shader_paths_in_dir<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut shader_paths = vec![];

    for suffix in ["*.vert", "*.frag"] {
        let pattern = dir.as_ref().join(suffix);
        let Some(pattern) = pattern.to_str() else {
            continue;
        };
        let Ok(entries) = glob(pattern) else {
            continue;
        };
        shader_paths.extend(entries.flatten());
    }

    shader_paths
}

/// `shaders/shader.vert` compiles to `shaders/vert.spv`, named after the stage.
fn output_path(shader: &Path) -> Option<PathBuf> {
    let stage = shader.extension()?;
    Some(shader.with_file_name(stage).with_extension("spv"))
}

fn compile_shader(compiler: &Path, shader: &Path) {
    let Some(output) = output_path(shader) else {
        return;
    };
    match Command::new(compiler).arg(shader).arg("-o").arg(&output).output() {
        Ok(result) if result.status.success() => {}
        Ok(result) => println!(
            "cargo:warning=failed to compile {}: {}",
            shader.display(),
            String::from_utf8_lossy(&result.stderr).trim()
        ),
        Err(err) => println!(
            "cargo:warning=could not run {}: {err}",
            compiler.display()
        ),
    }
}

fn main() {
    println!("cargo:rerun-if-changed={SHADER_SRC_DIR}");
    println!("cargo:rerun-if-env-changed=VULKAN_SDK");

    let Some(compiler) = find_compiler() else {
        println!(
            "cargo:warning={GLSL_COMPILER_NAME} not found, using the SPIR-V already in {SHADER_SRC_DIR}/"
        );
        return;
    };

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    shader_paths_in_dir(Path::new(&manifest_dir).join(SHADER_SRC_DIR))
        .iter()
        .for_each(|shader| compile_shader(&compiler, shader));
}
