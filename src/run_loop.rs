use tracing::{info, warn};

use crate::error::Result;

/// Source of window events, polled once per frame.
pub trait EventPump {
    fn poll_events(&mut self);
    fn close_requested(&self) -> bool;
}

/// Pumps events and draws frames until the window asks to close, then waits
/// for the device to go idle. Close is only checked between frames.
///
/// The idle wait runs on every exit path, including a failed frame. Returns the
/// number of frames drawn.
pub fn run_until_closed<P, D, I>(pump: &mut P, mut draw_frame: D, wait_idle: I) -> Result<u64>
where
    P: EventPump,
    D: FnMut() -> Result<()>,
    I: FnOnce() -> Result<()>,
{
    let mut frames = 0u64;
    let drawn = loop {
        pump.poll_events();
        if pump.close_requested() {
            break Ok(());
        }
        if let Err(err) = draw_frame() {
            break Err(err);
        }
        frames += 1;
    };

    let idle = wait_idle();
    match (drawn, idle) {
        (Err(err), idle) => {
            if let Err(idle_err) = idle {
                warn!("device did not go idle after a failed frame: {idle_err}");
            }
            Err(err)
        }
        (Ok(()), Err(idle_err)) => Err(idle_err),
        (Ok(()), Ok(())) => {
            info!("Window closed after {frames} frames");
            Ok(frames)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ash::vk;

    use super::*;
    use crate::error::{Error, ErrorKind, FrameStage};

    /// Requests close on the given poll, counting from one.
    struct ScriptedPump {
        close_on_poll: u32,
        polls: u32,
    }

    impl ScriptedPump {
        fn closing_on(close_on_poll: u32) -> Self {
            Self {
                close_on_poll,
                polls: 0,
            }
        }
    }

    impl EventPump for ScriptedPump {
        fn poll_events(&mut self) {
            self.polls += 1;
        }

        fn close_requested(&self) -> bool {
            self.polls >= self.close_on_poll
        }
    }

    #[test]
    fn close_on_first_poll_draws_nothing_but_still_idles() {
        let mut pump = ScriptedPump::closing_on(1);
        let drawn = Cell::new(0);
        let idled = Cell::new(false);

        let frames = run_until_closed(
            &mut pump,
            || {
                drawn.set(drawn.get() + 1);
                Ok(())
            },
            || {
                idled.set(true);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(frames, 0);
        assert_eq!(drawn.get(), 0);
        assert!(idled.get());
    }

    #[test]
    fn draws_one_frame_per_poll_until_close() {
        let mut pump = ScriptedPump::closing_on(4);
        let frames = run_until_closed(&mut pump, || Ok(()), || Ok(())).unwrap();
        assert_eq!(frames, 3);
        assert_eq!(pump.polls, 4);
    }

    #[test]
    fn failed_frame_stops_the_loop_and_idles() {
        let mut pump = ScriptedPump::closing_on(100);
        let drawn = Cell::new(0);
        let idled = Cell::new(false);

        let err = run_until_closed(
            &mut pump,
            || {
                drawn.set(drawn.get() + 1);
                if drawn.get() == 2 {
                    return Err(Error::Draw {
                        stage: FrameStage::Submit,
                        result: vk::Result::ERROR_DEVICE_LOST,
                    });
                }
                Ok(())
            },
            || {
                idled.set(true);
                Ok(())
            },
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Draw);
        assert_eq!(drawn.get(), 2);
        assert_eq!(pump.polls, 2);
        assert!(idled.get());
    }

    #[test]
    fn frame_error_wins_over_idle_error() {
        let mut pump = ScriptedPump::closing_on(100);
        let err = run_until_closed(
            &mut pump,
            || Err(Error::draw(FrameStage::Record)(vk::Result::ERROR_OUT_OF_HOST_MEMORY)),
            || Err(Error::draw(FrameStage::Idle)(vk::Result::ERROR_DEVICE_LOST)),
        )
        .unwrap_err();

        match err {
            Error::Draw { stage, .. } => assert_eq!(stage, FrameStage::Record),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn idle_failure_after_clean_close_is_reported() {
        let mut pump = ScriptedPump::closing_on(1);
        let err = run_until_closed(
            &mut pump,
            || Ok(()),
            || Err(Error::draw(FrameStage::Idle)(vk::Result::ERROR_DEVICE_LOST)),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Draw);
    }
}
