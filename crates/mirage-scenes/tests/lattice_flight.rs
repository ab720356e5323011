//! End-to-end flights through the raymarched scenes on a headless GPU.

use std::time::{Duration, Instant};

use mirage_engine::core::{LifecycleState, Scene};
use mirage_engine::math::Vec3;
use mirage_engine::render::HeadlessBackend;
use mirage_engine::sensor::{RotationFeed, RotationSample, TrackerState};
use mirage_scenes::{MengerPrisonScene, PrisonConfig, ResolutionScale};

fn assert_vec_close(a: Vec3, b: Vec3) {
    assert!(a.distance(b) < 1.0e-5, "{a:?} != {b:?}");
}

fn prison(gpu: &mut HeadlessBackend, feed: RotationFeed) -> MengerPrisonScene {
    let mut scene = MengerPrisonScene::new(PrisonConfig::default(), ResolutionScale::Quarter, feed);
    scene.on_attach();
    scene.on_surface_created(gpu).unwrap();
    scene.on_surface_changed(gpu, 1920, 1080).unwrap();
    scene
}

#[test]
fn full_hd_at_quarter_scale_renders_480_by_270() {
    let mut gpu = HeadlessBackend::new(1920, 1080);
    let mut scene = prison(&mut gpu, RotationFeed::new());
    assert_eq!(scene.render_size(), (480, 270));
    assert_eq!(scene.lifecycle().state(), LifecycleState::Resized);

    scene.on_draw_frame(&mut gpu, Instant::now()).unwrap();
    assert_eq!(scene.lifecycle().state(), LifecycleState::Running);
    scene.on_detach(&mut gpu);
}

#[test]
fn one_decisecond_moves_half_speed_times_forward() {
    let mut gpu = HeadlessBackend::new(1920, 1080);
    let mut scene = prison(&mut gpu, RotationFeed::new());
    assert_eq!(scene.camera().speed, 0.5);

    let t0 = Instant::now();
    scene.on_draw_frame(&mut gpu, t0).unwrap();
    let start = scene.camera().position;
    let forward = scene.camera().forward();

    scene
        .on_draw_frame(&mut gpu, t0 + Duration::from_millis(100))
        .unwrap();

    assert_vec_close(scene.camera().position, start + forward * (0.5 * 0.1));
    assert!((scene.elapsed_secs() - 0.1).abs() < 1.0e-6);
    assert_eq!(scene.resets(), 0);
    scene.on_detach(&mut gpu);
}

#[test]
fn flying_into_the_lattice_resets() {
    let mut gpu = HeadlessBackend::new(1920, 1080);
    let feed = RotationFeed::new();
    let mut scene = prison(&mut gpu, feed.clone());

    let t0 = Instant::now();
    feed.publish(RotationSample::from_vector(0.0, 0.0, 0.1));
    scene.on_draw_frame(&mut gpu, t0).unwrap();
    assert_eq!(scene.sensor().state(), TrackerState::Baselined);

    // One step short of solid material on the +Z axis.
    let solid = Vec3::new(0.3, -0.1674, -0.1674);
    assert!(PrisonConfig::default().prison.distance(solid) < 0.0);
    scene.camera_mut().position = solid - Vec3::Z * 0.05;

    scene
        .on_draw_frame(&mut gpu, t0 + Duration::from_millis(100))
        .unwrap();

    assert_eq!(scene.resets(), 1);
    assert_eq!(scene.camera().position, PrisonConfig::default().home());
    assert_eq!(scene.elapsed_secs(), 0.0);
    assert_eq!(scene.sensor().state(), TrackerState::Uninitialized);

    // The clock keeps running from the reset rather than jumping.
    scene
        .on_draw_frame(&mut gpu, t0 + Duration::from_millis(150))
        .unwrap();
    assert!((scene.elapsed_secs() - 0.05).abs() < 1.0e-6);
    scene.on_detach(&mut gpu);
}

#[test]
fn detach_stops_sensor_and_frees_gpu() {
    let mut gpu = HeadlessBackend::new(1920, 1080);
    let feed = RotationFeed::new();
    let mut scene = prison(&mut gpu, feed.clone());
    assert!(feed.is_registered());

    scene.on_draw_frame(&mut gpu, Instant::now()).unwrap();
    scene.on_detach(&mut gpu);

    assert!(!feed.is_registered());
    assert!(!feed.publish(RotationSample::IDENTITY));
    assert!(gpu.counts().is_balanced());
    assert_eq!(gpu.live_handles(), 0);
    assert!(scene.on_draw_frame(&mut gpu, Instant::now()).is_err());
}
