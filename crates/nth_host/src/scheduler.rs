//! Drives one engine frame and one composite per display refresh.
use crate::compositor::{CompositeError, Compositor};
use crate::engine::Engine;
use crate::frame::ScaledFrame;
use crate::framerate::FrameRate;
use crate::persistence::store::SaveStore;
use crate::session::Session;
use std::num::NonZeroU32;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No engine instance, nothing to draw.
    Idle,
    /// An engine is present and a tick should be scheduled every display refresh.
    Running,
}

pub struct RenderScheduler {
    state: RunState,
    compositor: Compositor,
    frame: ScaledFrame,
    framerate: FrameRate,
}

impl RenderScheduler {
    pub fn new(scale: NonZeroU32) -> Self {
        let compositor = Compositor::new(scale);

        Self {
            state: RunState::Idle,
            frame: compositor.new_frame(),
            compositor,
            framerate: FrameRate::new(Instant::now()),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Frames per second measured over the last completed window.
    pub fn fps(&self) -> Option<u32> {
        self.framerate.fps()
    }

    /// The most recently composited frame, or a cleared LCD if nothing ran yet.
    pub fn frame(&self) -> &ScaledFrame {
        &self.frame
    }

    /// Run one tick.
    ///
    /// Advances the session's engine by one frame, then composites its LCD. Whether another tick should be scheduled
    /// is decided purely by the presence of an engine, see [RenderScheduler::state].
    ///
    /// # Returns
    /// * `Ok(Some(frame))` - The new frame to present.
    /// * `Ok(None)` - There is no engine, the scheduler is now idle.
    /// * `Err(_)` - The engine produced an unusable frame. The instance was ejected and the scheduler is idle.
    pub fn tick<E: Engine, S: SaveStore>(
        &mut self,
        session: &mut Session<E, S>,
        now: Instant,
    ) -> Result<Option<&ScaledFrame>, CompositeError> {
        let Some(engine) = session.engine_mut() else {
            if self.state == RunState::Running {
                log::debug!("Engine gone, render loop going idle");
            }
            self.state = RunState::Idle;
            return Ok(None);
        };

        if self.state == RunState::Idle {
            log::debug!("Engine available, render loop starting");
            self.state = RunState::Running;
            self.framerate.reset(now);
        }

        engine.update_rtc_now(unix_now());
        engine.next_frame();

        let result = if engine.lcd_cleared() {
            self.compositor.blank(&mut self.frame);
            Ok(())
        } else {
            self.compositor.compose(engine.lcd_buffer(), &mut self.frame)
        };

        if let Err(e) = result {
            log::error!("Halting session, engine produced a corrupt frame: {}", e);

            if let Err(save_err) = session.eject() {
                log::warn!("Failed to save halted session: {}", save_err);
            }
            self.state = RunState::Idle;

            return Err(e);
        }

        if let Some(fps) = self.framerate.frame_finished(now) {
            log::trace!("{} FPS", fps);
        }

        Ok(Some(&self.frame))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::compositor::CompositeError;
    use crate::engine::mock::MockEngine;
    use crate::palette::Shade;
    use crate::persistence::store::MemoryStore;
    use crate::persistence::PersistenceManager;
    use crate::scheduler::{RenderScheduler, RunState};
    use crate::session::Session;
    use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
    use std::num::NonZeroU32;
    use std::time::{Duration, Instant};

    fn setup() -> (RenderScheduler, Session<MockEngine, MemoryStore>) {
        let scheduler = RenderScheduler::new(NonZeroU32::new(2).unwrap());
        let session = Session::new(PersistenceManager::new(MemoryStore::new()));

        (scheduler, session)
    }

    #[test]
    fn test_idle_without_engine() {
        let (mut scheduler, mut session) = setup();

        assert_eq!(scheduler.tick(&mut session, Instant::now()), Ok(None));
        assert_eq!(scheduler.state(), RunState::Idle);
    }

    #[test]
    fn test_tick_advances_before_compositing() {
        let (mut scheduler, mut session) = setup();
        session.load_cartridge("game.gb", &[0x01]).unwrap();

        let frame = scheduler.tick(&mut session, Instant::now()).unwrap().unwrap();

        // The mock darkens the first pixel on its first frame, which must already be visible.
        assert_eq!(frame.width(), DISPLAY_WIDTH * 2);
        assert_eq!(frame.height(), DISPLAY_HEIGHT * 2);
        assert_eq!(frame.pixel(0, 0), Some(Shade::LightGrey.color()));
        assert_eq!(frame.pixel(1, 1), Some(Shade::LightGrey.color()));
        assert_eq!(frame.pixel(2, 0), Some(Shade::White.color()));
        assert_eq!(scheduler.state(), RunState::Running);

        let engine = session.engine().unwrap();
        assert_eq!(engine.frames, 1);
        assert!(engine.rtc_now.is_some());
    }

    #[test]
    fn test_goes_idle_once_engine_is_ejected() {
        let (mut scheduler, mut session) = setup();
        session.load_cartridge("game.gb", &[0x01]).unwrap();
        scheduler.tick(&mut session, Instant::now()).unwrap();

        session.eject().unwrap();

        assert_eq!(scheduler.tick(&mut session, Instant::now()), Ok(None));
        assert_eq!(scheduler.state(), RunState::Idle);
    }

    #[test]
    fn test_cleared_lcd_is_blank() {
        let (mut scheduler, mut session) = setup();
        session.load_cartridge("game.gb", &[0x01]).unwrap();
        let engine = session.engine_mut().unwrap();
        engine.cleared = true;
        engine.lcd.fill(0x00);

        let frame = scheduler.tick(&mut session, Instant::now()).unwrap().unwrap();

        assert!(frame.iter().all(|px| *px == Shade::White.color()));
    }

    #[test]
    fn test_corrupt_frame_halts_session() {
        let (mut scheduler, mut session) = setup();
        session.load_cartridge("game.gb", &[0x01]).unwrap();
        let engine = session.engine_mut().unwrap();
        engine.lcd.truncate(100);
        engine.ram = vec![3; 8];

        let result = scheduler.tick(&mut session, Instant::now());

        assert!(matches!(result, Err(CompositeError::BufferTooShort { actual: 100, .. })));
        assert_eq!(scheduler.state(), RunState::Idle);
        assert!(!session.is_running());
        assert_eq!(session.persistence().load("game.gb").ram, vec![3; 8]);
    }

    #[test]
    fn test_fps_counts_ticks() {
        let (mut scheduler, mut session) = setup();
        session.load_cartridge("game.gb", &[0x01]).unwrap();
        let start = Instant::now();

        for i in 0..30u64 {
            scheduler.tick(&mut session, start + Duration::from_millis(i * 33)).unwrap();
        }
        assert_eq!(scheduler.fps(), None);

        scheduler.tick(&mut session, start + Duration::from_millis(1000)).unwrap();
        assert_eq!(scheduler.fps(), Some(31));
    }
}
