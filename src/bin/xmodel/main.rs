//! XModel CLI - Tool for inspecting and converting XModel files.

use std::env;
use std::path::Path;

use rayon::prelude::*;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use xmodel::prelude::*;
use xmodel::core::header_comment;

fn init_logging(level: &str) {
    // RUST_LOG wins over the command line flags.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    init_logging(if json_mode { "error" } else { level });

    let result = match filtered_args[0] {
        "info" | "i" => {
            let Some(&path) = filtered_args.get(1) else {
                usage_error("info <file>");
            };
            cmd_info(path)
        }

        "convert" | "c" => {
            let (Some(&input), Some(&output)) = (filtered_args.get(1), filtered_args.get(2)) else {
                usage_error("convert <input> <output> [--format export|bin] [--version N] [--strict] [--no-split] [--header]");
            };
            ConvertArgs::parse(&filtered_args[3..]).and_then(|opts| cmd_convert(input, output, &opts))
        }

        "batch" | "b" => {
            let Some(format) = filtered_args.get(1).and_then(|f| parse_format(f)) else {
                usage_error("batch <export|bin> <files...>");
            };
            cmd_batch(format, &filtered_args[2..])
        }

        "dump" | "d" => {
            let Some(&path) = filtered_args.get(1) else {
                usage_error("dump <file> [--json]");
            };
            cmd_dump(path, json_mode)
        }

        "validate" | "check" => {
            let Some(&path) = filtered_args.get(1) else {
                usage_error("validate <file>");
            };
            cmd_validate(path)
        }

        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        other => {
            // Assume it's a file path
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                eprintln!("Unknown command: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Error: missing argument");
    eprintln!("Usage: xmodel {}", usage);
    std::process::exit(1);
}

fn print_help() {
    println!("XModel CLI - Inspect and convert xmodel_export / xmodel_bin / xanim_bin files");
    println!();
    println!("Usage: xmodel [options] <command> [args]");
    println!();
    println!("Commands:");
    println!("  i, info <file>                 Show version and element counts");
    println!("  c, convert <in> <out> [opts]   Convert between text and binary");
    println!("      --format export|bin        Output format (default: from extension)");
    println!("      --version N                Output version (default: input version)");
    println!("      --strict                   Fail on engine limit violations");
    println!("      --no-split                 Keep all geometry in one mesh");
    println!("      --header                   Write the default header comment");
    println!("  b, batch <export|bin> <files>  Convert many files in parallel");
    println!("  d, dump <file> [--json]        Print bones, meshes and materials");
    println!("  validate <file>                Report degenerate faces");
    println!("  h, help                        Show this help");
    println!();
    println!("Options:");
    println!("  -v, --verbose  Debug output");
    println!("  -vv, --trace   Trace output (very verbose)");
    println!("  -q, --quiet    Errors only");
    println!();
    println!("RUST_LOG overrides the verbosity flags.");
}

fn is_anim(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("xanim_bin"))
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "export" | "xmodel_export" => Some(Format::Export),
        "bin" | "xmodel_bin" => Some(Format::Bin),
        _ => None,
    }
}

// ============================================================================
// info
// ============================================================================

fn cmd_info(path: &str) -> Result<()> {
    tracing::info!("Opening: {}", path);

    if is_anim(path) {
        let anim = Anim::load_bin(path, &ReadOptions::default())?;
        println!("Anim: {}", path);
        println!("Version: {}", anim.version.unwrap_or(0));
        println!("Framerate: {}", anim.framerate);
        println!("Parts:  {}", anim.parts.len());
        println!("Frames: {}", anim.frames.len());
        println!("Notes:  {}", anim.notes.len());
        return Ok(());
    }

    let model = Model::load(path)?;
    println!("Model: {}", path);
    println!("Version: {}", model.version.unwrap_or(0));
    if let Some(comment) = &model.comment {
        println!("Comment: {}", comment.trim_end());
    }
    println!();
    println!("Bones:     {} ({} cosmetic)", model.bones.len(), model.cosmetic_count());
    println!("Meshes:    {}", model.meshes.len());
    println!("Vertices:  {}", model.vertex_count());
    println!("Faces:     {}", model.face_count());
    println!("Materials: {}", model.materials.len());
    Ok(())
}

// ============================================================================
// convert / batch
// ============================================================================

#[derive(Debug, Default)]
struct ConvertArgs {
    format: Option<Format>,
    version: Option<u16>,
    strict: bool,
    split: bool,
    header: bool,
}

impl ConvertArgs {
    fn parse(args: &[&str]) -> Result<Self> {
        let mut out = ConvertArgs {
            split: true,
            ..Default::default()
        };
        let mut iter = args.iter();
        while let Some(&arg) = iter.next() {
            match arg {
                "--format" | "-f" => {
                    let value = iter.next().copied().unwrap_or_default();
                    out.format = Some(
                        parse_format(value)
                            .ok_or_else(|| Error::other(format!("unknown format '{}'", value)))?,
                    );
                }
                "--version" => {
                    let value = iter.next().copied().unwrap_or_default();
                    out.version = Some(
                        value
                            .parse()
                            .map_err(|_| Error::other(format!("invalid version '{}'", value)))?,
                    );
                }
                "--strict" => out.strict = true,
                "--no-split" => out.split = false,
                "--header" => out.header = true,
                other => return Err(Error::other(format!("unknown option '{}'", other))),
            }
        }
        Ok(out)
    }
}

fn cmd_convert(input: &str, output: &str, args: &ConvertArgs) -> Result<()> {
    let read_opts = ReadOptions::default().with_split_meshes(args.split);
    let format = args
        .format
        .or_else(|| Format::from_path(output))
        .unwrap_or_default();

    let mut opts = WriteOptions::new(format).with_strict(args.strict);
    if let Some(version) = args.version {
        opts = opts.with_version(version);
    }
    if args.header {
        opts = opts.with_header(header_comment(output));
    }

    if is_anim(input) {
        let mut anim = Anim::load_bin(input, &read_opts)?;
        anim.save_bin(output, &opts)?;
    } else {
        let mut model = Model::load_with(input, &read_opts)?;
        model.save(output, &opts)?;
    }
    println!("{} -> {}", input, output);
    Ok(())
}

fn cmd_batch(format: Format, files: &[&str]) -> Result<()> {
    if files.is_empty() {
        return Err(Error::other("no input files"));
    }

    let failures: Vec<(String, Error)> = files
        .par_iter()
        .filter_map(|&input| {
            let output = Path::new(input).with_extension(format.model_extension());
            convert_one(input, &output).err().map(|e| (input.to_string(), e))
        })
        .collect();

    for (input, e) in &failures {
        eprintln!("  FAILED {}: {}", input, e);
    }
    println!(
        "Converted {}/{} files",
        files.len() - failures.len(),
        files.len()
    );

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::other(format!("{} conversions failed", failures.len())))
    }
}

fn convert_one(input: &str, output: &Path) -> Result<()> {
    let mut model = Model::load(input)?;
    let opts = WriteOptions::for_path(output).with_header(header_comment(output));
    model.save(output, &opts)?;
    tracing::info!("{} -> {}", input, output.display());
    Ok(())
}

// ============================================================================
// dump / validate
// ============================================================================

fn cmd_dump(path: &str, json_mode: bool) -> Result<()> {
    if is_anim(path) {
        return dump_anim(path, json_mode);
    }
    let model = Model::load(path)?;

    if json_mode {
        let bones: Vec<_> = model
            .bones
            .iter()
            .map(|b| {
                serde_json::json!({
                    "name": b.name,
                    "parent": b.parent,
                    "cosmetic": b.cosmetic,
                    "offset": b.offset.to_array(),
                    "matrix": b.matrix.map(|r| r.to_array()),
                })
            })
            .collect();
        let meshes: Vec<_> = model
            .meshes
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "verts": m.verts.len(),
                    "faces": m.faces.len(),
                })
            })
            .collect();
        let materials: Vec<_> = model
            .materials
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "type": m.material_type,
                    "images": m.images.to_ref_string(true),
                })
            })
            .collect();

        let doc = serde_json::json!({
            "file": path,
            "version": model.version,
            "bones": bones,
            "meshes": meshes,
            "materials": materials,
        });
        let text = serde_json::to_string_pretty(&doc).map_err(|e| Error::other(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Model: {} (version {})", path, model.version.unwrap_or(0));
    println!();
    println!("Bones:");
    for (i, bone) in model.bones.iter().enumerate() {
        let flag = if bone.cosmetic { " [cosmetic]" } else { "" };
        println!(
            "  {:>4} {:<32} parent {:>4}  offset ({:.4}, {:.4}, {:.4}){}",
            i, bone.name, bone.parent, bone.offset.x, bone.offset.y, bone.offset.z, flag
        );
    }
    println!();
    println!("Meshes:");
    for mesh in &model.meshes {
        println!("  {:<32} {} verts, {} faces", mesh.name, mesh.verts.len(), mesh.faces.len());
    }
    println!();
    println!("Materials:");
    for (i, m) in model.materials.iter().enumerate() {
        println!("  {:>4} {:<24} {:<10} {}", i, m.name, m.material_type, m.images.to_ref_string(true));
    }
    Ok(())
}

fn dump_anim(path: &str, json_mode: bool) -> Result<()> {
    let anim = Anim::load_bin(path, &ReadOptions::default())?;

    if json_mode {
        let frames: Vec<_> = anim
            .frames
            .iter()
            .map(|f| {
                let parts: Vec<_> = f
                    .parts
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "offset": p.offset.to_array(),
                            "matrix": p.matrix.map(|r| r.to_array()),
                        })
                    })
                    .collect();
                serde_json::json!({ "frame": f.frame, "parts": parts })
            })
            .collect();
        let notes: Vec<_> = anim
            .notes
            .iter()
            .map(|n| serde_json::json!({ "frame": n.frame, "note": n.string }))
            .collect();

        let doc = serde_json::json!({
            "file": path,
            "version": anim.version,
            "framerate": anim.framerate,
            "parts": anim.parts.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "frames": frames,
            "notes": notes,
        });
        let text = serde_json::to_string_pretty(&doc).map_err(|e| Error::other(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Anim: {} (version {}, {} fps)", path, anim.version.unwrap_or(0), anim.framerate);
    println!();
    println!("Parts:");
    for (i, part) in anim.parts.iter().enumerate() {
        println!("  {:>4} {}", i, part.name);
    }
    println!();
    println!("Frames: {}", anim.frames.len());
    if let (Some(first), Some(last)) = (anim.frames.first(), anim.frames.last()) {
        println!("  range {}..={}", first.frame, last.frame);
    }
    println!();
    println!("Notes:");
    for note in &anim.notes {
        println!("  {:>6} {}", note.frame, note.string);
    }
    Ok(())
}

fn cmd_validate(path: &str) -> Result<()> {
    let model = Model::load(path)?;

    let mut degenerate = 0usize;
    for mesh in &model.meshes {
        for (i, face) in mesh.degenerate_faces() {
            let ids = face.indices.map(|c| c.vertex);
            println!("  {}: face {} repeats a vertex {:?}", mesh.name, i, ids);
            degenerate += 1;
        }
    }

    let overweight = model
        .meshes
        .iter()
        .flat_map(|m| &m.verts)
        .filter(|v| v.weights.len() > MAX_WEIGHTS)
        .count();

    println!("{}: {} faces, {} degenerate", path, model.face_count(), degenerate);
    if overweight > 0 {
        println!("{}: {} vertices exceed {} weights", path, overweight, MAX_WEIGHTS);
    }
    Ok(())
}
