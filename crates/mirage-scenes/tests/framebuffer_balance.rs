//! Resource accounting across resolution changes.

use mirage_engine::core::Scene;
use mirage_engine::render::{FrameBuffer, GpuBackend, HeadlessBackend};
use mirage_scenes::{CubeConfig, InfiniteCubeScene};

#[test]
fn create_destroy_create_at_new_size_leaks_nothing() {
    let mut gpu = HeadlessBackend::new(800, 600);
    let mut fb = FrameBuffer::create(&mut gpu, 800, 600).unwrap();
    fb.destroy(&mut gpu);
    let mut fb = FrameBuffer::create(&mut gpu, 400, 300).unwrap();
    assert_eq!(fb.size(), (400, 300));
    fb.destroy(&mut gpu);

    let counts = gpu.counts();
    assert!(counts.is_balanced());
    assert_eq!(counts.framebuffers_created, 2);
    assert_eq!(counts.textures_created, 2);
    assert_eq!(counts.depth_stencils_created, 2);
    assert_eq!(gpu.live_handles(), 0);
}

#[test]
fn incomplete_framebuffer_is_fatal_and_rolled_back() {
    let mut gpu = HeadlessBackend::new(800, 600);
    gpu.force_incomplete(true);
    let mut scene = InfiniteCubeScene::new(CubeConfig::default());
    assert!(scene.on_surface_created(&mut gpu).is_err());
    scene.on_detach(&mut gpu);
    assert!(gpu.counts().is_balanced());
    assert_eq!(gpu.live_handles(), 0);
}

#[test]
fn rotation_churn_keeps_two_targets() {
    let mut gpu = HeadlessBackend::new(1080, 1920);
    let mut scene = InfiniteCubeScene::new(CubeConfig::default());
    scene.on_surface_created(&mut gpu).unwrap();
    for i in 0..10 {
        let (w, h) = if i % 2 == 0 { (1920, 1080) } else { (1080, 1920) };
        gpu.set_surface_size(w, h);
        scene.on_surface_changed(&mut gpu, w, h).unwrap();
        assert_eq!(gpu.live_framebuffers(), 2);
        assert_eq!(gpu.surface_size(), (w, h));
    }
    scene.on_detach(&mut gpu);
    assert!(gpu.counts().is_balanced());
}
