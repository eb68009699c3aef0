//! Probe microgame — a scriptable plug-in that records how the orchestrator
//! drives it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use microrush_core::microgame::{
    InputEvent, InputHandler, MicrogameDescriptor, MicrogameHandle, RoundContext, RoundId,
    TimerTag,
};
use microrush_core::surface::{Node, Point, Shape};

const WIN_TIMER: TimerTag = TimerTag(1);
const FAIL_TIMER: TimerTag = TimerTag(2);

/// What a probe does once set up.
///
/// Keyboard scripting (when `handles_input` is set): `"w"` wins, `"f"`
/// fails, `"2"` signals a win twice in the same callback. Every other event
/// is only recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeScript {
    /// Win this long after setup.
    pub win_after: Option<Duration>,
    /// Fail this long after setup.
    pub fail_after: Option<Duration>,
    /// Expose the input capability.
    pub handles_input: bool,
    /// Request an animation frame every frame.
    pub animates: bool,
}

/// What the orchestrator did to a probe.
#[derive(Debug, Default)]
pub struct ProbeLog {
    /// `(round, score)` for every setup call.
    pub setups: Vec<(RoundId, u32)>,
    /// Number of cleanup calls.
    pub cleanups: usize,
    /// Input events received.
    pub inputs: Vec<InputEvent>,
    /// Timers that fired.
    pub timers_fired: Vec<TimerTag>,
    /// Animation frames received.
    pub frames: usize,
}

/// Factory for probe descriptors.
#[derive(Debug)]
pub struct ProbeMicrogame {
    script: ProbeScript,
    log: Arc<Mutex<ProbeLog>>,
}

impl ProbeMicrogame {
    /// Builds a descriptor whose rounds follow `script` and write to `log`.
    #[must_use]
    pub fn descriptor(
        id: &str,
        script: ProbeScript,
        log: &Arc<Mutex<ProbeLog>>,
    ) -> MicrogameDescriptor {
        let log = Arc::clone(log);
        let instruction = format!("PROBE {id}");
        let node_id = format!("probe-{id}");
        MicrogameDescriptor::new(id, instruction, move |ctx: &mut RoundContext<'_>| -> Box<dyn MicrogameHandle> {
            log.lock()
                .unwrap()
                .setups
                .push((ctx.round(), ctx.score()));
            ctx.field().upsert(Node::new(
                node_id.clone(),
                Shape::Glyph("?".to_owned()),
                Point::default(),
            ));
            if let Some(delay) = script.win_after {
                ctx.link().schedule(delay, WIN_TIMER);
            }
            if let Some(delay) = script.fail_after {
                ctx.link().schedule(delay, FAIL_TIMER);
            }
            if script.animates {
                ctx.link().request_frame();
            }
            Box::new(Self {
                script,
                log: Arc::clone(&log),
            })
        })
    }

    /// A fresh shared log.
    #[must_use]
    pub fn new_log() -> Arc<Mutex<ProbeLog>> {
        Arc::new(Mutex::new(ProbeLog::default()))
    }
}

impl InputHandler for ProbeMicrogame {
    fn on_input(&mut self, event: &InputEvent, ctx: &mut RoundContext<'_>) {
        self.log.lock().unwrap().inputs.push(event.clone());
        match event.key_name() {
            Some("w") => ctx.link().win(),
            Some("f") => ctx.link().fail(),
            Some("2") => {
                ctx.link().win();
                ctx.link().win();
            }
            _ => {}
        }
    }
}

impl MicrogameHandle for ProbeMicrogame {
    fn input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        if self.script.handles_input {
            Some(self)
        } else {
            None
        }
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut RoundContext<'_>) {
        self.log.lock().unwrap().timers_fired.push(tag);
        if tag == WIN_TIMER {
            ctx.link().win();
        } else if tag == FAIL_TIMER {
            ctx.link().fail();
        }
    }

    fn on_frame(&mut self, ctx: &mut RoundContext<'_>) {
        self.log.lock().unwrap().frames += 1;
        ctx.link().request_frame();
    }

    fn cleanup(&mut self) {
        self.log.lock().unwrap().cleanups += 1;
    }
}
