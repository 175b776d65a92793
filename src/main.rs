use std::collections::BTreeMap;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use console::style;
use lumen::scene::{Film, Scene, ShapeKind};
use lumen::{Loader, Options};

#[derive(clap::Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scene files to parse. A `.txt` file is treated as a manifest
    /// listing one `.pbrt` path per line.
    inputs: Vec<String>,

    /// Leave `plymesh` shapes unloaded instead of reading their files.
    #[arg(long)]
    skip_ply: bool,

    /// Tokenizer buffer capacity in bytes.
    #[arg(long)]
    buffer_capacity: Option<usize>,

    /// Maximum nesting depth for Include files.
    #[arg(long)]
    max_include_depth: Option<u32>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.inputs.is_empty() {
        eprintln!("error: no input files");
        return ExitCode::FAILURE;
    }

    let mut options = Options::default();
    if let Some(capacity) = args.buffer_capacity {
        options.buffer_capacity = capacity;
    }
    if let Some(depth) = args.max_include_depth {
        options.max_include_depth = depth;
    }

    let files = match expand_inputs(&args.inputs) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut any_failed = false;
    for file in &files {
        println!("{} {}", style("Parsing").bold().green(), file);
        let start_time = Instant::now();

        let mut loader = Loader::with_options(options.clone());
        if !loader.load(file) {
            match loader.error() {
                Some(err) => eprintln!("{} {}", style("error:").bold().red(), err),
                None => eprintln!("{} parse failed", style("error:").bold().red()),
            }
            any_failed = true;
            continue;
        }

        let mut scene = loader.take_scene().expect("a successful load yields a scene");

        if !args.skip_ply {
            if let Err(err) = scene.load_all_ply_meshes(false) {
                eprintln!("{} {}", style("error:").bold().red(), err);
                any_failed = true;
            }
        }

        let elapsed = start_time.elapsed();
        print_scene_summary(&scene);
        println!(
            "{} in {}.{:03} seconds\n",
            style("Done").bold().green(),
            elapsed.as_secs(),
            elapsed.subsec_millis(),
        );
    }

    if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Expands manifest files into the scene files they list.
fn expand_inputs(inputs: &[String]) -> Result<Vec<String>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if input.ends_with(".txt") {
            let contents = fs::read_to_string(input)
                .map_err(|e| format!("failed to read manifest '{}': {}", input, e))?;
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                files.push(line.to_string());
            }
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn print_scene_summary(scene: &Scene) {
    if let Some(Film::Image {
        xresolution,
        yresolution,
        filename,
        ..
    }) = &scene.film
    {
        println!(
            "  film: {}x{} -> \"{}\"",
            xresolution, yresolution, filename
        );
    }

    let mut shape_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut triangles: u64 = 0;
    for shape in &scene.shapes {
        let name = match &shape.kind {
            ShapeKind::Cone(_) => "cone",
            ShapeKind::Curve(_) => "curve",
            ShapeKind::Cylinder(_) => "cylinder",
            ShapeKind::Disk(_) => "disk",
            ShapeKind::Hyperboloid(_) => "hyperboloid",
            ShapeKind::Paraboloid(_) => "paraboloid",
            ShapeKind::Sphere(_) => "sphere",
            ShapeKind::TriangleMesh(mesh) => {
                triangles += mesh.num_triangles() as u64;
                "trianglemesh"
            }
            ShapeKind::HeightField(_) => "heightfield",
            ShapeKind::LoopSubdiv(_) => "loopsubdiv",
            ShapeKind::Nurbs(_) => "nurbs",
            ShapeKind::PlyMesh(_) => "plymesh",
        };
        *shape_counts.entry(name).or_default() += 1;
    }

    print!("  shapes: {}", scene.shapes.len());
    if !shape_counts.is_empty() {
        let breakdown: Vec<String> = shape_counts
            .iter()
            .map(|(name, count)| format!("{} {}", count, name))
            .collect();
        print!(" ({})", breakdown.join(", "));
    }
    println!();
    if triangles > 0 {
        println!("  triangles: {}", triangles);
    }

    println!(
        "  objects: {}, instances: {}",
        scene.objects.len(),
        scene.instances.len()
    );
    println!(
        "  lights: {}, area lights: {}",
        scene.lights.len(),
        scene.area_lights.len()
    );
    println!(
        "  materials: {}, textures: {}, mediums: {}",
        scene.materials.len(),
        scene.textures.len(),
        scene.mediums.len()
    );
}
