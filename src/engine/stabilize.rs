use super::{LayoutMode, LifecycleState};

pub(super) const GRACE_STEPS: u32 = 180;
const PULSE_INTERVAL_STEPS: u32 = 240;
const PULSE_ALPHA: f32 = 0.12;

pub(super) enum Verdict {
    Continue,
    Converging,
    Lock,
}

pub(super) struct Stabilizer {
    mode: LayoutMode,
    post_lock_steps: u32,
    drag_disabled: bool,
}

impl Stabilizer {
    pub(super) fn new(mode: LayoutMode) -> Self {
        Self {
            mode,
            post_lock_steps: 0,
            drag_disabled: false,
        }
    }

    pub(super) fn evaluate(
        &self,
        state: LifecycleState,
        alpha: f32,
        ticks: u32,
        converging_alpha: f32,
        alpha_min: f32,
        tick_budget: u32,
    ) -> Verdict {
        if state == LifecycleState::Locked {
            return Verdict::Continue;
        }
        if alpha < alpha_min || ticks >= tick_budget {
            return Verdict::Lock;
        }
        if state == LifecycleState::Running && alpha < converging_alpha {
            return Verdict::Converging;
        }
        Verdict::Continue
    }

    pub(super) fn mark_locked(&mut self) {
        self.post_lock_steps = 0;
    }

    pub(super) fn after_lock_step(&mut self) -> Option<f32> {
        self.post_lock_steps = self.post_lock_steps.saturating_add(1);
        match self.mode {
            LayoutMode::FullForce => {
                if !self.drag_disabled && self.post_lock_steps >= GRACE_STEPS {
                    self.drag_disabled = true;
                    log::debug!("drag grace window elapsed, detaching pointer moves");
                }
                None
            }
            LayoutMode::RadialPulse => {
                if self.post_lock_steps >= PULSE_INTERVAL_STEPS {
                    self.post_lock_steps = 0;
                    Some(PULSE_ALPHA)
                } else {
                    None
                }
            }
        }
    }

    pub(super) fn drag_disabled(&self) -> bool {
        self.drag_disabled
    }
}
