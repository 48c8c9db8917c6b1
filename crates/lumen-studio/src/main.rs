use anyhow::{Context, Result};
use glam::{Mat4, Vec3, Vec4};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use lumen_engine::assets::{Cubemap, Image, Mesh};
use lumen_engine::device::{Gpu, GpuInit};
use lumen_engine::logging::{LoggingConfig, init_logging};
use lumen_engine::pool::{PoolConfig, ResourcePool};
use lumen_engine::render::{ColorPassUniforms, PassUniforms, ShadowPassUniforms, prepare_material};
use lumen_engine::scene::{Material, NodeId, Renderable, SceneGraph};
use lumen_engine::texture::ColorSpace;
use lumen_engine::uniforms::{FrameData, FrameDataShadow};

const DEFAULT_FRAMES: u32 = 120;
const DEFAULT_RENDERABLES: usize = 16;

const LIGHT_POSITION: Vec3 = Vec3::new(6.0, 10.0, 4.0);
const EYE: Vec3 = Vec3::new(0.0, 4.0, 12.0);

/// Command line: `lumen-studio [frames] [renderables]`.
struct Args {
    frames: u32,
    renderables: usize,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);

    let frames = args
        .next()
        .map(|s| s.parse().with_context(|| format!("invalid frame count '{s}'")))
        .transpose()?
        .unwrap_or(DEFAULT_FRAMES);
    let renderables = args
        .next()
        .map(|s| s.parse().with_context(|| format!("invalid renderable count '{s}'")))
        .transpose()?
        .unwrap_or(DEFAULT_RENDERABLES);

    Ok(Args {
        frames,
        renderables,
    })
}

/// Procedural test scene: a floor and a ring of shapes orbiting the origin.
struct Scene {
    graph: SceneGraph,
    orbit: NodeId,
    spinners: Vec<NodeId>,
    renderables: Vec<Renderable>,
}

fn build_scene(count: usize, environment: &Cubemap) -> Scene {
    let mut graph = SceneGraph::new();

    // ── shared assets ────────────────────────────────────────────────────
    let mut cube = Mesh::cube(1.0);
    cube.generate_tangents();
    let mut sphere = Mesh::sphere(0.6, 16, 24);
    sphere.generate_tangents();
    let floor_mesh = Mesh::quad();

    let checker = Image::checker(256, 32, [230, 230, 230, 255], [40, 40, 40, 255]);
    let flat_normal = Image::solid(4, 4, [128, 128, 255, 255]);

    let painted = Material {
        base_color_texture: Some(checker.clone()),
        normal_map: Some(flat_normal),
        ..Material::default()
    };
    let chrome = Material {
        base_color: Vec4::new(0.9, 0.9, 0.95, 1.0),
        roughness: 0.1,
        reflection_map: Some(environment.clone()),
        ..Material::default()
    };

    // ── floor ────────────────────────────────────────────────────────────
    let floor_node = graph.add_node(
        None,
        Mat4::from_scale(Vec3::splat(20.0)) * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2),
    );
    let floor = Renderable::new(floor_node, floor_mesh).with_material(Material {
        base_color_texture: Some(checker),
        casts_shadow: false,
        ..Material::default()
    });

    // ── orbiting ring ────────────────────────────────────────────────────
    let orbit = graph.add_node(None, Mat4::IDENTITY);
    let mut spinners = Vec::with_capacity(count);
    let mut renderables = Vec::with_capacity(count + 1);
    renderables.push(floor);

    for i in 0..count {
        let angle = i as f32 / count.max(1) as f32 * std::f32::consts::TAU;
        let offset = Vec3::new(angle.cos() * 5.0, 1.0, angle.sin() * 5.0);
        let node = graph.add_node(Some(orbit), Mat4::from_translation(offset));
        spinners.push(node);

        let (mesh, material) = if i % 2 == 0 {
            (cube.clone(), painted.clone())
        } else {
            (sphere.clone(), chrome.clone())
        };
        renderables.push(Renderable::new(node, mesh).with_material(material));
    }

    graph.resolve();
    Scene {
        graph,
        orbit,
        spinners,
        renderables,
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let args = parse_args()?;

    let gpu = Gpu::new_blocking(GpuInit::default()).context("failed to initialize GPU")?;
    let mut pool = ResourcePool::new(&gpu, PoolConfig::default());

    // ── assets ───────────────────────────────────────────────────────────
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let poisson = Image::poisson_disc(64, 64, 6.0, &mut rng)
        .context("failed to generate poisson samples")?;
    let environment = Cubemap::uniform(Image::checker(128, 16, [90, 140, 220, 255], [20, 30, 60, 255]));

    let mut scene = build_scene(args.renderables, &environment);
    info!(
        "scene: {} nodes, {} renderables",
        scene.graph.len(),
        scene.renderables.len()
    );

    pool.texture(&poisson, ColorSpace::Linear)
        .context("failed to upload poisson samples")?;
    let environment_mips = pool
        .cubemap(&environment)
        .context("failed to upload environment map")?
        .mip_level_count();

    for renderable in &scene.renderables {
        prepare_material(&mut pool, &renderable.material)
            .context("failed to prepare material textures")?;
    }

    let casters: Vec<Renderable> = scene
        .renderables
        .iter()
        .filter(|r| r.material.casts_shadow)
        .cloned()
        .collect();

    // ── passes ───────────────────────────────────────────────────────────
    let mut shadow_pass: ShadowPassUniforms<'_, Gpu> = PassUniforms::new(&gpu, "shadow pass");
    let mut color_pass: ColorPassUniforms<'_, Gpu> = PassUniforms::new(&gpu, "color pass");

    let light = FrameDataShadow::directional(LIGHT_POSITION, Vec3::ZERO, 12.0, 40.0);
    let view = Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);

    // ── frame loop ───────────────────────────────────────────────────────
    let mut draws = 0usize;
    for frame in 0..args.frames {
        let t = frame as f32 / 60.0;

        scene.graph.set_local(scene.orbit, Mat4::from_rotation_y(t * 0.5));
        // Every other shape spins on its own axis as well.
        for (i, node) in scene.spinners.iter().enumerate().step_by(2) {
            let translation = scene.graph.local(*node).w_axis.truncate();
            scene.graph.set_local(
                *node,
                Mat4::from_translation(translation) * Mat4::from_rotation_y(t * (1.0 + i as f32 * 0.1)),
            );
        }
        let resolved = scene.graph.resolve();

        let shadow_draws = shadow_pass
            .prepare(&light, &casters, &scene.graph, &mut pool, |r, world| r.shadow_data(world))
            .context("failed to prepare shadow pass")?;

        let frame_data = FrameData {
            view,
            projection,
            shadow_view_projection: light.view_projection(),
            view_position: EYE.extend(1.0),
            light_position: LIGHT_POSITION.extend(1.0),
            poisson_samples: poisson.width(),
            has_environment_map: 1,
            mip_level_count: environment_mips,
            _pad: 0,
        };
        let color_draws = color_pass
            .prepare(&frame_data, &scene.renderables, &scene.graph, &mut pool, |r, world| {
                r.model_data(world)
            })
            .context("failed to prepare color pass")?;

        gpu.flush();
        draws += shadow_draws.len() + color_draws.len();

        if frame % 30 == 0 {
            debug!(
                "frame {frame}: {resolved} nodes resolved, {} shadow draws, {} color draws",
                shadow_draws.len(),
                color_draws.len()
            );
        }
    }

    // ── summary ──────────────────────────────────────────────────────────
    let stats = pool.stats();
    info!(
        "{} frames, {draws} draws; pool: {} textures, {} cubemaps, {} meshes ({} hits, {} misses)",
        args.frames, stats.textures, stats.cubemaps, stats.meshes, stats.hits, stats.misses
    );
    info!(
        "uniform uploads: shadow pass {}, color pass {}",
        shadow_pass.upload_count(),
        color_pass.upload_count()
    );

    Ok(())
}
