//! The `orrery` binary: loads the catalog, builds the star system, and drives
//! it frame by frame against the headless renderer.

mod error;
mod headless;
mod platform;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use orrery_catalog::Catalog;
use orrery_config::{CliArgs, Config};
use orrery_scene::{Renderer, SolarSystem, TextureSet};
use orrery_sim::{AnimationScheduler, CameraRig, ControlSurface, FrameDriver};
use tracing::{info, warn};

use crate::error::AppError;
use crate::headless::HeadlessRenderer;
use crate::platform::PlatformDirs;

/// Upper bound on texture polls before giving up.
const MAX_TEXTURE_POLLS: u32 = 600;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("orrery: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let mut dirs = PlatformDirs::resolve()?;
    if let Some(config_dir) = &args.config {
        dirs = dirs.with_config_dir(config_dir);
    }
    dirs.create_dirs()?;

    let on_disk = Config::load_or_create(&dirs.config_dir)?;
    let mut config = on_disk.clone();
    config.apply_cli_overrides(args);
    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        "Orrery starting: config {}, catalog {}",
        dirs.config_dir.display(),
        config.scene.catalog_path.display()
    );

    let catalog = Catalog::load(&config.scene.catalog_path, &settings::catalog_units(&config))?;
    let mut renderer = HeadlessRenderer::new(config.window.width, config.window.height)?;
    let textures = resolve_textures(&catalog, &config.scene.texture_dir, &mut renderer)?;

    let system = SolarSystem::build(
        &catalog,
        &textures,
        &settings::build_settings(&config),
        &mut renderer,
    )?;
    let mut driver = FrameDriver::new(
        system,
        ControlSurface::new(settings::control_state(&config), settings::control_limits(&config)),
        AnimationScheduler::new(config.scene.reference_fps),
        CameraRig::new(
            settings::camera_settings(&config),
            config.window.width,
            config.window.height,
        ),
        settings::key_bindings(&config),
    );
    driver.start(&mut renderer)?;
    run_frames(&mut driver, &mut renderer, &config, &dirs.config_dir, on_disk)?;

    if renderer.missing_textures() > 0 {
        warn!(
            "{} texture images were not found under {}",
            renderer.missing_textures(),
            config.scene.texture_dir.display()
        );
    }
    info!(
        "Ran {} frames ({:.1}s simulated) over {} primitives at {:?}; camera {:?}",
        renderer.draw_count(),
        driver.clock().total_time(),
        renderer.primitive_count(),
        renderer.size(),
        driver.camera().target()
    );
    Ok(())
}

/// Drive frames until the budget runs out, picking up control edits from
/// `config.ron` once per simulated second. Returns the frames run.
fn run_frames<R: Renderer + ?Sized>(
    driver: &mut FrameDriver,
    renderer: &mut R,
    config: &Config,
    config_dir: &Path,
    mut on_disk: Config,
) -> Result<u64, AppError> {
    let fps = config.scene.reference_fps.max(1.0);
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(fps));
    let reload_every = (fps.round() as u64).max(1);
    let budget = settings::frame_budget(config);
    if budget.is_none() {
        info!("Running until interrupted");
    }

    let mut frame = 0;
    while budget.is_none_or(|budget| frame < budget) {
        if frame > 0 && frame % reload_every == 0 {
            reload_controls(config_dir, &mut on_disk, driver);
        }
        match budget {
            Some(_) => driver.frame_with(frame_time, renderer)?,
            None => {
                std::thread::sleep(frame_time);
                driver.frame(renderer)?
            }
        };
        frame += 1;
    }
    Ok(frame)
}

/// Queue control writes for fields edited in `config.ron` since the last look.
fn reload_controls(config_dir: &Path, on_disk: &mut Config, driver: &mut FrameDriver) {
    match on_disk.reload(config_dir) {
        Ok(Some(next)) => {
            let events = settings::control_changes(on_disk, &next);
            info!("config.ron changed, applying {} control edits", events.len());
            for event in events {
                driver.queue(event);
            }
            *on_disk = next;
        }
        Ok(None) => {}
        Err(err) => warn!("Ignoring config.ron reload: {err}"),
    }
}

/// Request every catalog texture and poll until none is pending.
fn resolve_textures<R: Renderer + ?Sized>(
    catalog: &Catalog,
    texture_dir: &Path,
    renderer: &mut R,
) -> Result<TextureSet, AppError> {
    let paths: Vec<(&str, PathBuf)> = catalog
        .textures
        .iter()
        .map(|(key, path)| (key.as_str(), texture_dir.join(path)))
        .collect();
    let mut textures = TextureSet::request(
        renderer,
        paths.iter().map(|(key, path)| (*key, path.as_path())),
    )?;

    let mut polls = 0;
    let mut pending = textures.poll(renderer);
    while pending > 0 {
        polls += 1;
        if polls >= MAX_TEXTURE_POLLS {
            return Err(AppError::TexturesStalled { pending, polls });
        }
        std::thread::sleep(Duration::from_millis(1));
        pending = textures.poll(renderer);
    }

    for key in textures.failed_keys() {
        warn!("Texture '{key}' failed to load");
    }
    info!("Textures settled after {} polls", polls + 1);
    Ok(textures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_sim::{CameraTarget, InputEvent};

    fn workspace_root() -> &'static Path {
        Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../.."))
    }

    fn shipped_driver(config: &Config, renderer: &mut HeadlessRenderer) -> FrameDriver {
        let root = workspace_root();
        let catalog = Catalog::load(
            &root.join(&config.scene.catalog_path),
            &settings::catalog_units(config),
        )
        .unwrap();
        let textures =
            resolve_textures(&catalog, &root.join(&config.scene.texture_dir), renderer).unwrap();
        let system =
            SolarSystem::build(&catalog, &textures, &settings::build_settings(config), renderer)
                .unwrap();
        let mut driver = FrameDriver::new(
            system,
            ControlSurface::new(settings::control_state(config), settings::control_limits(config)),
            AnimationScheduler::new(config.scene.reference_fps),
            CameraRig::new(settings::camera_settings(config), 1280, 720),
            settings::key_bindings(config),
        );
        driver.start(renderer).unwrap();
        driver
    }

    #[test]
    fn test_shipped_catalog_runs_headless() {
        let config = Config::default();
        let root = workspace_root();
        let catalog = Catalog::load(
            &root.join(&config.scene.catalog_path),
            &settings::catalog_units(&config),
        )
        .unwrap();
        assert_eq!(catalog.bodies.len(), 9);

        let mut renderer = HeadlessRenderer::new(1280, 720).unwrap();
        let textures =
            resolve_textures(&catalog, &root.join(&config.scene.texture_dir), &mut renderer)
                .unwrap();
        assert!(textures.is_settled());

        let system = SolarSystem::build(
            &catalog,
            &textures,
            &settings::build_settings(&config),
            &mut renderer,
        )
        .unwrap();
        assert_eq!(system.selectables().len(), catalog.iter_all().count());
        assert_eq!(system.paths.len(), catalog.iter_all().count());
        assert!(system.entity("Saturn").unwrap().ring.is_some());

        let mut renderer = HeadlessRenderer::new(1280, 720).unwrap();
        let mut driver = shipped_driver(&config, &mut renderer);
        driver.queue(InputEvent::SelectBody("Jupiter".to_string()));
        for _ in 0..120 {
            driver
                .frame_with(Duration::from_secs_f64(1.0 / 60.0), &mut renderer)
                .unwrap();
        }
        assert_eq!(renderer.draw_count(), 120);
        assert_eq!(
            driver.camera().target(),
            &CameraTarget::Locked("Jupiter".to_string())
        );
        assert!((driver.clock().total_time() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_budget_and_config_edits_reach_controls() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = Config::load_or_create(dir.path()).unwrap();
        let mut config = on_disk.clone();
        config.debug.headless_frames = 61;

        let mut renderer = HeadlessRenderer::new(1280, 720).unwrap();
        let mut driver = shipped_driver(&config, &mut renderer);

        let mut edited = on_disk.clone();
        edited.control.speed = 3.0;
        edited.control.show_orbits = false;
        edited.save(dir.path()).unwrap();

        let frames = run_frames(&mut driver, &mut renderer, &config, dir.path(), on_disk).unwrap();
        assert_eq!(frames, 61);
        assert_eq!(renderer.draw_count(), 61);
        assert_eq!(driver.control().state().speed, 3.0);
        assert!(!driver.control().state().show_orbits);
    }
}
