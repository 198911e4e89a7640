use crate::frame::Frame;
use crate::layout::VertexBufferPlan;
use crate::renderer::Renderer;
use meshview_input::MovementFlags;
use meshview_scene::SceneState;
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Period of the `time` uniform in milliseconds.
pub const TIME_PERIOD_MS: u64 = 2000;

/// Source of wall-clock milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock driven by hand. With a non-zero `step`, every read advances time
/// by `step` milliseconds after returning.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    step: u64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
            step: 0,
        }
    }

    /// Clock that moves forward by `step_ms` on every read.
    pub fn stepping(start_ms: u64, step_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
            step: step_ms,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

/// Cooperative cancellation for a running loop. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("render loop has not been started")]
    NotRunning,
    #[error("render loop is already running")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Uninitialized,
    Running { last_tick_ms: u64, frames: u64 },
}

/// Frame driver: `Uninitialized` until `start`, then `Running` for good.
///
/// Each `tick` measures wall-clock time since the previous tick (or since
/// `start` for the first one), advances the scene, and describes the two
/// draws for the backend.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    plan: VertexBufferPlan,
    state: LoopState,
}

impl RenderLoop {
    pub fn new(plan: VertexBufferPlan) -> Self {
        Self {
            plan,
            state: LoopState::Uninitialized,
        }
    }

    pub fn plan(&self) -> &VertexBufferPlan {
        &self.plan
    }

    /// Enter `Running`. The frame timer starts here, not at construction.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), LoopError> {
        if self.is_running() {
            return Err(LoopError::AlreadyRunning);
        }
        let now = clock.now_ms();
        self.state = LoopState::Running {
            last_tick_ms: now,
            frames: 0,
        };
        tracing::info!(
            mesh_vertices = self.plan.mesh_vertex_count(),
            grid_vertices = self.plan.grid_vertex_count(),
            "render loop running"
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        match self.state {
            LoopState::Uninitialized => 0,
            LoopState::Running { frames, .. } => frames,
        }
    }

    /// Advance the scene by elapsed time and describe the next frame.
    pub fn tick(
        &mut self,
        clock: &impl Clock,
        scene: &mut SceneState,
        flags: &MovementFlags,
    ) -> Result<Frame, LoopError> {
        let LoopState::Running {
            last_tick_ms,
            frames,
        } = self.state
        else {
            return Err(LoopError::NotRunning);
        };

        let now = clock.now_ms();
        // a clock that steps backwards yields a zero delta
        let delta_ms = now.saturating_sub(last_tick_ms) as f32;
        self.state = LoopState::Running {
            last_tick_ms: now,
            frames: frames + 1,
        };

        scene.advance(delta_ms, flags);
        let time_ms = (now % TIME_PERIOD_MS) as f32;
        let frame = Frame::new(
            frames,
            &scene.matrices(),
            &self.plan,
            scene.effect.value(),
            time_ms,
        );
        tracing::trace!(frame = frames, delta_ms, time_ms, "tick");
        Ok(frame)
    }

    /// Drive frames into `renderer` until `stop` is cancelled or
    /// `max_frames` frames have been produced. Returns the number of frames
    /// rendered by this call.
    pub fn run<R: Renderer>(
        &mut self,
        clock: &impl Clock,
        scene: &mut SceneState,
        flags: &MovementFlags,
        renderer: &mut R,
        stop: &StopToken,
        max_frames: Option<u64>,
    ) -> Result<u64, LoopError> {
        let mut rendered = 0u64;
        while !stop.is_cancelled() && max_frames.is_none_or(|max| rendered < max) {
            let frame = self.tick(clock, scene, flags)?;
            renderer.render(&frame);
            rendered += 1;
        }
        tracing::debug!(rendered, cancelled = stop.is_cancelled(), "render loop stopped");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use meshview_common::{MeshData, ShaderVariant};
    use meshview_scene::ROTATION_SPEED;

    fn plan() -> VertexBufferPlan {
        let mesh = MeshData::new(vec![0.0; 9], vec![0.0; 9]);
        VertexBufferPlan::new(&mesh, &[0.0; 12]).unwrap()
    }

    fn scene() -> SceneState {
        SceneState::new(ShaderVariant::Noisy, 0.0)
    }

    /// Counts frames and cancels the token after `limit`.
    struct CancelAfter {
        limit: u64,
        seen: Vec<u64>,
        stop: StopToken,
    }

    impl Renderer for CancelAfter {
        type Output = ();

        fn render(&mut self, frame: &Frame) -> Self::Output {
            self.seen.push(frame.index);
            if self.seen.len() as u64 >= self.limit {
                self.stop.cancel();
            }
        }
    }

    #[test]
    fn tick_before_start_fails() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::new(0);
        let err = lp
            .tick(&clock, &mut scene(), &MovementFlags::default())
            .unwrap_err();
        assert_eq!(err, LoopError::NotRunning);
        assert!(!lp.is_running());
    }

    #[test]
    fn start_is_one_way() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::new(0);
        lp.start(&clock).unwrap();
        assert!(lp.is_running());
        assert_eq!(lp.start(&clock), Err(LoopError::AlreadyRunning));
        assert!(lp.is_running());
    }

    #[test]
    fn first_delta_measures_from_start() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::new(1_000_000);
        let mut scene = scene();
        lp.start(&clock).unwrap();
        clock.advance(20);
        lp.tick(&clock, &mut scene, &MovementFlags::default())
            .unwrap();
        let expected = Mat4::from_rotation_y((ROTATION_SPEED * 20.0).to_radians());
        assert!(scene.world().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn time_uniform_wraps() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::new(3_999);
        lp.start(&clock).unwrap();
        let mut scene = scene();
        let flags = MovementFlags::default();
        let f = lp.tick(&clock, &mut scene, &flags).unwrap();
        assert_eq!(f.time_ms, 1999.0);
        clock.advance(1);
        let f = lp.tick(&clock, &mut scene, &flags).unwrap();
        assert_eq!(f.time_ms, 0.0);
        assert_eq!(f.index, 1);
        assert_eq!(lp.frames(), 2);
    }

    #[test]
    fn backwards_clock_is_zero_delta() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::new(500);
        lp.start(&clock).unwrap();
        clock.set(100);
        let mut scene = scene();
        lp.tick(&clock, &mut scene, &MovementFlags::default())
            .unwrap();
        assert_eq!(scene.world(), Mat4::IDENTITY);
    }

    #[test]
    fn stop_token_ends_run() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::stepping(0, 16);
        lp.start(&clock).unwrap();
        let stop = StopToken::new();
        let mut renderer = CancelAfter {
            limit: 5,
            seen: Vec::new(),
            stop: stop.clone(),
        };
        let n = lp
            .run(
                &clock,
                &mut scene(),
                &MovementFlags::default(),
                &mut renderer,
                &stop,
                None,
            )
            .unwrap();
        assert_eq!(n, 5);
        assert_eq!(renderer.seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn run_respects_frame_budget() {
        let mut lp = RenderLoop::new(plan());
        let clock = ManualClock::stepping(0, 10);
        lp.start(&clock).unwrap();
        let stop = StopToken::new();
        let mut renderer = CancelAfter {
            limit: u64::MAX,
            seen: Vec::new(),
            stop: stop.clone(),
        };
        let n = lp
            .run(
                &clock,
                &mut scene(),
                &MovementFlags::default(),
                &mut renderer,
                &stop,
                Some(3),
            )
            .unwrap();
        assert_eq!(n, 3);
        assert!(!stop.is_cancelled());
    }

    #[test]
    fn run_before_start_fails() {
        let mut lp = RenderLoop::new(plan());
        let stop = StopToken::new();
        let mut renderer = crate::DebugTextRenderer::new();
        let result = lp.run(
            &ManualClock::new(0),
            &mut scene(),
            &MovementFlags::default(),
            &mut renderer,
            &stop,
            Some(1),
        );
        assert_eq!(result, Err(LoopError::NotRunning));
    }
}
