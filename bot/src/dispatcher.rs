//! Routes inbound messages to handlers.

use crate::commands::{ignore, job, report, Command};
use crate::extractor::SourceExtractor;
use crate::guard::{guard, Authorizer, MessageContext};
use crate::reply::Reply;
use crate::state::AppState;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Owner of all command-layer state.
///
/// One dispatcher exists per process; every message is handled through
/// `&mut self`, so handlers never run concurrently.
pub struct Dispatcher<E> {
    state: AppState,
    extractor: E,
    authorizer: Box<dyn Authorizer>,
}

impl<E: SourceExtractor> Dispatcher<E> {
    pub fn new(extractor: E, authorizer: impl Authorizer + 'static) -> Self {
        Self {
            state: AppState::new(),
            extractor,
            authorizer: Box::new(authorizer),
        }
    }

    /// Cap the verification count a job may ask for.
    #[must_use]
    pub fn with_max_verification_links(mut self, max: usize) -> Self {
        self.state.max_verification_links = max;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Whether `ctx` passes the guard.
    pub fn is_privileged(&self, ctx: &MessageContext) -> bool {
        self.authorizer.is_privileged(&ctx.actor, ctx.channel)
    }

    /// Handle one message and return the replies to send back.
    pub async fn handle(&mut self, ctx: &MessageContext, line: &str) -> Vec<Reply> {
        if let Err(rejection) = guard(self.authorizer.as_ref(), ctx) {
            return vec![rejection];
        }

        let command = Command::parse(line);
        let span = tracing::info_span!("job", id = %self.state.job.id, step = %self.state.job.step);
        self.route(command).instrument(span).await
    }

    /// Handle one message, abandoning it if a privileged stop arrives meanwhile.
    ///
    /// Lines received from `inbox` while the message runs are queued in
    /// `pending`. A stop drops the in-flight handler, discarding whatever it
    /// had accumulated, and then runs the stop command itself.
    pub async fn handle_cancellable(
        &mut self,
        ctx: &MessageContext,
        line: &str,
        inbox: &mut mpsc::Receiver<String>,
        pending: &mut VecDeque<String>,
    ) -> Vec<Reply> {
        let privileged = self.is_privileged(ctx);

        let finished = {
            let handling = self.handle(ctx, line);
            tokio::pin!(handling);
            loop {
                tokio::select! {
                    replies = &mut handling => break Some(replies),
                    Some(next) = inbox.recv() => {
                        if privileged && Command::parse(&next).is_end() {
                            tracing::warn!("Stop received; cancelling in-flight command");
                            break None;
                        }
                        pending.push_back(next);
                    }
                }
            }
        };

        match finished {
            Some(replies) => replies,
            None => self.handle(ctx, "/stop").await,
        }
    }

    async fn route(&mut self, command: Command) -> Vec<Reply> {
        tracing::debug!("Handling {:?}", command);
        match command {
            Command::Begin => job::begin(&mut self.state),
            Command::Text(text) => job::text(&mut self.state, &mut self.extractor, &text).await,
            Command::List => report::list(&self.state),
            Command::Summary => report::summary(&mut self.state),
            Command::Ignore(args) => ignore::ignore(&mut self.state, &args),
            Command::End => job::end(&mut self.state, &mut self.extractor).await,
            Command::Unknown(name) => vec![Reply::text(format!("Unknown command: /{name}"))],
        }
    }

    /// Release the browser session before exit.
    pub async fn shutdown(&mut self) {
        self.extractor.release().await;
    }
}
