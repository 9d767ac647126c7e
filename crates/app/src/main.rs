//! Entry point for meshview.
//! Loads an OBJ mesh with its MTL libraries, assembles render parts and
//! reports the camera framing the render loop would start from.

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{Context, Result};
use asset::{AssembledScene, assemble_scene, join_libraries, parse_geometry, parse_materials};
use corelib::{camera::OrbitCamera, framing::FramingPolicy};

const DEFAULT_OBJ: &str = "./obj/dust_bin.obj";

struct Options {
    obj: PathBuf,
    width: u32,
    height: u32,
    fov_deg: f32,
    policy: FramingPolicy,
    show_parts: bool,
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

fn parse_f32_arg(args: &[String], prefix: &str, default: f32) -> f32 {
    for arg in args {
        if let Some(val) = arg.strip_prefix(prefix) {
            match val.parse::<f32>() {
                Ok(v) if v.is_finite() && v > 0.0 => return v,
                _ => log::warn!("Ignoring invalid {}{}, using {}", prefix, val, default),
            }
        }
    }
    default
}

fn parse_options(args: &[String]) -> Options {
    // Accept: meshview [PATH | --obj=PATH] [--size=WxH] [--fov=DEG] [--parts]
    let obj = args
        .iter()
        .find_map(|arg| arg.strip_prefix("--obj="))
        .or_else(|| args.iter().map(String::as_str).find(|arg| !arg.starts_with("--")))
        .unwrap_or(DEFAULT_OBJ);

    let (width, height) = parse_size_args(args);
    let defaults = FramingPolicy::default();
    let policy = FramingPolicy {
        radius_scale: parse_f32_arg(args, "--radius-scale=", defaults.radius_scale),
        near_divisor: parse_f32_arg(args, "--near-divisor=", defaults.near_divisor),
        far_scale: parse_f32_arg(args, "--far-scale=", defaults.far_scale),
        ..defaults
    };

    Options {
        obj: PathBuf::from(obj),
        width,
        height,
        fov_deg: parse_f32_arg(args, "--fov=", 60.0),
        policy,
        show_parts: args.iter().any(|arg| arg == "--parts"),
    }
}

/// Read every referenced library relative to the OBJ, in parallel, keeping
/// reference order. Unreadable libraries are skipped with a warning.
fn read_material_libs(obj_path: &Path, libs: &[String]) -> Vec<String> {
    let base = obj_path.parent().unwrap_or_else(|| Path::new(""));
    thread::scope(|scope| {
        let handles: Vec<_> = libs
            .iter()
            .map(|lib| {
                let path = base.join(lib);
                scope.spawn(move || {
                    fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read MTL file: {}", path.display()))
                })
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(Ok(text)) => Some(text),
                Ok(Err(err)) => {
                    log::warn!("{:#}", err);
                    None
                }
                Err(_) => {
                    log::warn!("MTL reader thread panicked");
                    None
                }
            })
            .collect()
    })
}

fn load(options: &Options) -> Result<AssembledScene> {
    let text = fs::read_to_string(&options.obj)
        .with_context(|| format!("Failed to open OBJ file: {}", options.obj.display()))?;
    let scene = parse_geometry(&text)
        .with_context(|| format!("Failed to parse OBJ file: {}", options.obj.display()))?;

    let libs = read_material_libs(&options.obj, &scene.material_libs);
    let materials = parse_materials(&join_libraries(&libs)).context("Failed to parse MTL libraries")?;
    log::info!(
        "Loaded {} material(s) from {} of {} librar(y/ies)",
        materials.len(),
        libs.len(),
        scene.material_libs.len()
    );

    Ok(assemble_scene(scene, &materials, &options.policy))
}

fn report(options: &Options, assembled: &AssembledScene) -> Result<()> {
    log::info!(
        "{} part(s), {} vertices",
        assembled.parts.len(),
        assembled.vertex_count()
    );

    if options.show_parts {
        for part in &assembled.parts {
            let indexed = part
                .streams
                .to_indexed()
                .with_context(|| format!("Failed to index part '{}'", part.material_name))?;
            log::info!(
                "  '{}'{}: {} triangles, {} unique vertices, normals={}, texcoords={}, colors={}, diffuse={:?}",
                part.material_name,
                if part.resolved { "" } else { " (default)" },
                part.streams.triangle_count(),
                indexed.streams.vertex_count(),
                part.streams.normal.is_some(),
                part.streams.texcoord.is_some(),
                part.streams.color.is_some(),
                part.material.diffuse
            );
        }
    }

    let Some(framing) = assembled.framing else {
        log::warn!("Mesh is empty, nothing to frame");
        return Ok(());
    };

    let orbit = OrbitCamera::from_framing(&framing);
    let aspect = options.width as f32 / options.height as f32;
    let camera = orbit.camera(options.fov_deg.to_radians(), aspect);
    let mvp = camera.proj_view() * framing.model_matrix();

    log::info!(
        "Framing: offset={:?}, bounding_radius={:.4}, radius={:.4}, z_near={:.4}, z_far={:.4}, zoom=[{:.4}, {:.4}]",
        framing.object_offset,
        framing.bounding_radius,
        framing.radius,
        framing.z_near,
        framing.z_far,
        framing.zoom_bounds.0,
        framing.zoom_bounds.1
    );
    log::debug!("Initial eye={:?}, mvp={:?}", camera.eye, mvp);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_options(&args);
    log::info!(
        "Starting meshview. obj={}, viewport={}x{}, fov={}",
        options.obj.display(),
        options.width,
        options.height,
        options.fov_deg
    );

    let assembled = load(&options)?;
    report(&options, &assembled)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let o = parse_options(&[]);
        assert_eq!(o.obj, PathBuf::from(DEFAULT_OBJ));
        assert_eq!((o.width, o.height), (1280, 720));
        assert_eq!(o.fov_deg, 60.0);
        assert_eq!(o.policy, FramingPolicy::default());
        assert!(!o.show_parts);
    }

    #[test]
    fn flags_override_defaults() {
        let o = parse_options(&args(&[
            "--size=800x600",
            "--fov=45",
            "--radius-scale=2",
            "--near-divisor=abc",
            "--parts",
            "models/teapot.obj",
        ]));
        assert_eq!(o.obj, PathBuf::from("models/teapot.obj"));
        assert_eq!((o.width, o.height), (800, 600));
        assert_eq!(o.fov_deg, 45.0);
        assert_eq!(o.policy.radius_scale, 2.0);
        assert_eq!(o.policy.near_divisor, FramingPolicy::default().near_divisor);
        assert!(o.show_parts);
    }

    #[test]
    fn obj_flag_wins_over_positional() {
        let o = parse_options(&args(&["a.obj", "--obj=b.obj"]));
        assert_eq!(o.obj, PathBuf::from("b.obj"));
    }
}
