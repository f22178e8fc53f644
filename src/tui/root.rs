//! # Root
//!
//! Owns the active step and routes events to it.
//!
//! The root handles the navigation keys itself: Tab advances, Esc retreats
//! and Ctrl+C quits from any step. Everything else goes to the active step.
//!
//! It also owns the extension connectivity flag. Each `ConnectivityTick`
//! refreshes it from the relay and schedules the next tick, and the fresh
//! value is only pushed to the review step, which is the one that shows it.

use std::mem;

use log::debug;
use ratatui::Frame;

use crate::tui::component::{Effect, StepComponent, StepContext};
use crate::tui::components::{Outlets, PromptTypeSelector, Step, StepKind};
use crate::tui::event::TuiEvent;

pub struct Root {
    active: Step,
    ctx: StepContext,
    extension_connected: bool,
    outlets: Outlets,
}

impl Root {
    pub fn new(ctx: StepContext, outlets: Outlets) -> Self {
        let extension_connected = outlets.extension_connected();
        Self {
            active: Step::first(ctx.clone()),
            ctx,
            extension_connected,
            outlets,
        }
    }

    /// Effects to run before the first event: the first step's own, plus the
    /// first connectivity check.
    pub fn init(&self) -> Option<Effect> {
        Effect::batch(self.active.init(), Some(Effect::ScheduleConnectivityCheck))
    }

    pub fn active(&self) -> &Step {
        &self.active
    }

    pub fn extension_connected(&self) -> bool {
        self.extension_connected
    }

    pub fn handle_event(&mut self, event: TuiEvent) -> Option<Effect> {
        match event {
            TuiEvent::Quit => Some(Effect::Quit),
            TuiEvent::Advance => self.advance(),
            TuiEvent::Retreat => self.retreat(),
            TuiEvent::ConnectivityTick => {
                self.extension_connected = self.outlets.extension_connected();
                if self.active.kind() == StepKind::Review {
                    self.active
                        .handle_event(&TuiEvent::Connectivity(self.extension_connected));
                }
                Some(Effect::ScheduleConnectivityCheck)
            }
            event => {
                if let TuiEvent::Resize { width, height } = event {
                    self.ctx.width = width;
                    self.ctx.height = height;
                }
                match self.active.handle_event(&event) {
                    Some(Effect::Advance) => self.advance(),
                    effect => effect,
                }
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        self.active.render(frame, frame.area());
    }

    fn take_active(&mut self) -> Step {
        let placeholder = Step::PromptType(PromptTypeSelector::new(self.ctx.clone()));
        mem::replace(&mut self.active, placeholder)
    }

    fn advance(&mut self) -> Option<Effect> {
        let from = self.active.kind();
        let (mut next, effect) = self.take_active().advance();
        let to = next.kind();

        if from != to {
            debug!("Step {:?} -> {:?}", from, to);
            if let Step::Review(review) = &mut next {
                review.attach(self.extension_connected, self.outlets.clone());
            }
        }
        self.active = next;
        effect
    }

    fn retreat(&mut self) -> Option<Effect> {
        let from = self.active.kind();
        let (previous, effect) = self.take_active().retreat();
        debug!("Step {:?} <- {:?}", previous.kind(), from);
        self.active = previous;
        effect
    }
}
