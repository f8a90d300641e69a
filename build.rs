use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::Command,
};

const SHADERS: [(&str, &str); 2] = [
    ("shaders/shader.vert", "vert.spv"),
    ("shaders/shader.frag", "frag.spv"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=shaders/");

    // OUT_DIR is target/<profile>/build/<pkg>-<hash>/out, the binary lands in target/<profile>
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let profile_dir = out_dir
        .ancestors()
        .nth(3)
        .map(Path::to_path_buf)
        .ok_or("could not locate the target profile directory")?;
    let shader_dir = profile_dir.join("shaders");
    fs::create_dir_all(&shader_dir)?;

    for (source, output) in SHADERS {
        let result = match Command::new("glslc")
            .arg(source)
            .arg("-o")
            .arg(shader_dir.join(output))
            .output()
        {
            Ok(result) => result,
            Err(err) => {
                println!("cargo:warning=glslc unavailable, {source} not compiled: {err}");
                continue;
            }
        };
        io::stdout().write_all(&result.stdout)?;
        io::stderr().write_all(&result.stderr)?;
        if !result.status.success() {
            println!("cargo:warning=glslc failed to compile {source}");
        }
    }

    Ok(())
}
