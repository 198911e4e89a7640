use meshview_assets::parse_obj;
use meshview_common::ShaderVariant;
use meshview_input::MovementFlags;
use meshview_render::{
    DebugTextRenderer, DrawKind, ManualClock, RenderLoop, Renderer, StopToken, Topology,
    VertexBufferPlan,
};
use meshview_scene::{MIN_DISTANCE, SceneState, build_grid_with_extent};

const TRIANGLE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";

fn one_triangle_plan() -> VertexBufferPlan {
    let mesh = parse_obj(TRIANGLE_OBJ).unwrap();
    let grid = build_grid_with_extent(100.0, 100.0, 50.0, 50.0).unwrap();
    VertexBufferPlan::new(&mesh, &grid).unwrap()
}

#[test]
fn buffer_length_is_reproducible() {
    let a = one_triangle_plan();
    let b = one_triangle_plan();
    // 9 mesh position floats, 48 grid floats, then both again as normals
    assert_eq!(a.data().len(), 114);
    assert_eq!(a, b);
    assert_eq!(a.normal_offset(), 4 * (9 + 48));
}

#[test]
fn draw_counts_match_buffer_regions() {
    let mut lp = RenderLoop::new(one_triangle_plan());
    let clock = ManualClock::stepping(10_000, 16);
    let mut scene = SceneState::new(ShaderVariant::Cross, 0.0);
    lp.start(&clock).unwrap();

    let frame = lp
        .tick(&clock, &mut scene, &MovementFlags::default())
        .unwrap();
    assert_eq!(frame.mesh().vertex_count(), 9 / 3);
    assert_eq!(frame.grid().vertex_count(), 48 / 3);
    assert_eq!(frame.mesh().topology, Topology::Triangles);
    assert_eq!(frame.grid().kind, DrawKind::Grid);
    assert_eq!(frame.grid().vertices.start, 3);
}

#[test]
fn holding_forward_never_passes_min_distance() {
    let mut lp = RenderLoop::new(one_triangle_plan());
    let clock = ManualClock::stepping(0, 33);
    let mut scene = SceneState::new(ShaderVariant::Noisy, 0.0);
    let flags = MovementFlags {
        forward: true,
        ..Default::default()
    };
    lp.start(&clock).unwrap();
    for _ in 0..200 {
        let frame = lp.tick(&clock, &mut scene, &flags).unwrap();
        assert!(frame.eye().length() >= MIN_DISTANCE - 1e-4);
    }
    assert_eq!(scene.camera.distance, MIN_DISTANCE);
}

#[test]
fn headless_run_with_stop_token() {
    let mut lp = RenderLoop::new(one_triangle_plan());
    let clock = ManualClock::stepping(0, 16);
    let mut scene = SceneState::new(ShaderVariant::Wavy, 0.75);
    let stop = StopToken::new();
    lp.start(&clock).unwrap();

    let mut renderer = DebugTextRenderer::new();
    let n = lp
        .run(
            &clock,
            &mut scene,
            &MovementFlags::default(),
            &mut renderer,
            &stop,
            Some(10),
        )
        .unwrap();
    assert_eq!(n, 10);
    assert_eq!(renderer.frames(), 10);

    stop.cancel();
    let n = lp
        .run(
            &clock,
            &mut scene,
            &MovementFlags::default(),
            &mut renderer,
            &stop,
            None,
        )
        .unwrap();
    assert_eq!(n, 0);
    assert_eq!(lp.frames(), 10);

    let text = renderer.render(&lp.tick(&clock, &mut scene, &MovementFlags::default()).unwrap());
    assert!(text.contains("effect=0.75"));
}

#[test]
fn nan_effect_reaches_the_frame() {
    let mut lp = RenderLoop::new(one_triangle_plan());
    let clock = ManualClock::new(0);
    let mut scene = SceneState::new(ShaderVariant::GreenShift, 0.0);
    lp.start(&clock).unwrap();
    scene.effect.set_from_input("not a number");
    let frame = lp
        .tick(&clock, &mut scene, &MovementFlags::default())
        .unwrap();
    assert!(frame.effect_value.is_nan());
}
