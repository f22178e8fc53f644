use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::workspace::Workspace;
use crate::tui::components::Step;
use crate::tui::event::TuiEvent;

/// Side effects a step asks the event loop to perform.
///
/// Steps never touch the terminal or timers themselves; they describe what
/// they need and the loop carries it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    /// Show a steady block cursor for text editing.
    SteadyCursor,
    /// Arm the next connectivity check.
    ScheduleConnectivityCheck,
    /// The step wants to move forward, as if the advance key was pressed.
    Advance,
    Batch(Vec<Effect>),
}

impl Effect {
    /// Combine two optional effects into one.
    pub fn batch(a: Option<Effect>, b: Option<Effect>) -> Option<Effect> {
        match (a, b) {
            (None, None) => None,
            (Some(e), None) | (None, Some(e)) => Some(e),
            (Some(a), Some(b)) => Some(Effect::Batch(vec![a, b])),
        }
    }

    /// Flatten nested batches into a list, in order.
    pub fn into_vec(self) -> Vec<Effect> {
        match self {
            Effect::Batch(effects) => effects.into_iter().flat_map(Effect::into_vec).collect(),
            effect => vec![effect],
        }
    }
}

/// The step to install next, plus whatever it needs done on arrival.
pub type Transition = (Step, Option<Effect>);

/// Data every step carries so transitions can build neighbours.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub workspace: Arc<Workspace>,
    pub width: u16,
    pub height: u16,
}

impl StepContext {
    pub fn new(workspace: Arc<Workspace>, width: u16, height: u16) -> Self {
        Self {
            workspace,
            width,
            height,
        }
    }
}

/// One screen of the wizard.
///
/// A step owns its local state. `handle_event` mutates only that state,
/// `render` only reads it, and `advance`/`retreat` consume the step to build
/// its neighbour. Both transitions are total: when a precondition is not met
/// they hand back `self`.
pub trait StepComponent: Sized {
    fn init(&self) -> Option<Effect> {
        None
    }

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect>;

    fn render(&self, frame: &mut Frame, area: Rect);

    fn advance(self) -> Transition;

    fn retreat(self) -> Transition;
}
