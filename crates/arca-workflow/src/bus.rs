use std::collections::HashMap;

use tracing::debug;

use crate::commands::{Command, CommandKind};
use crate::error::{WorkflowError, WorkflowResult};
use crate::events::{Event, EventKind};
use crate::uow::UnitOfWork;

/// Either kind of dispatchable message.
#[derive(Clone, Debug)]
pub enum Message {
    Event(Event),
    Command(Command),
}

pub type EventHandler = Box<dyn Fn(&Event, &mut UnitOfWork) -> WorkflowResult<()> + Send + Sync>;
pub type CommandHandler =
    Box<dyn Fn(&Command, &mut UnitOfWork) -> WorkflowResult<()> + Send + Sync>;

/// Synchronous, single-threaded message dispatcher.
///
/// Events fan out to every registered handler in registration order;
/// commands go to exactly one handler. After each dispatch the bus drains
/// at most one follow-up event from the unit of work's outbox onto its own
/// worklist, so a linear workflow interleaves naturally with fan-out.
///
/// The worklist is a stack: when a dispatch produces several follow-ups
/// over successive drains, the most recently pushed one runs first.
#[derive(Default)]
pub struct MessageBus {
    event_handlers: HashMap<EventKind, Vec<EventHandler>>,
    command_handlers: HashMap<CommandKind, CommandHandler>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the event's fan-out list.
    pub fn register_event_handler(&mut self, kind: EventKind, handler: EventHandler) {
        self.event_handlers.entry(kind).or_default().push(handler);
    }

    /// Install the single handler for a command.
    ///
    /// Fails if the command already has one.
    pub fn register_command_handler(
        &mut self,
        kind: CommandKind,
        handler: CommandHandler,
    ) -> WorkflowResult<()> {
        if self.command_handlers.contains_key(&kind) {
            return Err(WorkflowError::CommandHandlerAlreadyRegistered(
                kind.discriminator().to_string(),
            ));
        }
        self.command_handlers.insert(kind, handler);
        Ok(())
    }

    /// Dispatch a message and every follow-up it transitively produces.
    ///
    /// Returns once the worklist is empty. A handler error aborts the run
    /// and propagates; follow-ups still queued are abandoned.
    pub fn handle(&self, message: Message, uow: &mut UnitOfWork) -> WorkflowResult<()> {
        let mut worklist = vec![message];
        while let Some(message) = worklist.pop() {
            match &message {
                Message::Event(event) => {
                    debug!(kind = %event.kind(), package = event.package_identifier(), "dispatching event");
                    let handlers = self
                        .event_handlers
                        .get(&event.kind())
                        .ok_or_else(|| WorkflowError::NoHandlerForEvent(event.kind().to_string()))?;
                    for handler in handlers {
                        handler(event, uow)?;
                    }
                }
                Message::Command(command) => {
                    debug!(kind = %command.kind(), "dispatching command");
                    let handler = self.command_handlers.get(&command.kind()).ok_or_else(|| {
                        WorkflowError::NoHandlerForCommand(command.kind().to_string())
                    })?;
                    handler(command, uow)?;
                }
            }
            if let Some(event) = uow.pop_event() {
                worklist.push(Message::Event(event));
            }
        }
        Ok(())
    }
}
