//! Authorization for every command.

use crate::reply::Reply;
use std::collections::HashSet;

/// Sent in place of any reply when the sender lacks privileges.
pub const ADMINS_ONLY: &str = "🚫 This command is for admins only.";

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// One-to-one conversation with the bot
    Private,
    /// Shared conversation
    Group,
}

/// Sender and channel of one inbound message.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub actor: Actor,
    pub channel: Channel,
}

impl MessageContext {
    pub fn new(actor: Actor, channel: Channel) -> Self {
        Self { actor, channel }
    }
}

/// Decides whether an actor may run commands in a channel.
pub trait Authorizer: Send + Sync {
    fn is_privileged(&self, actor: &Actor, channel: Channel) -> bool;
}

/// Private channels are always privileged; in groups only listed admins are.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    admins: HashSet<String>,
}

impl StaticAuthorizer {
    pub fn new(admins: impl IntoIterator<Item = String>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

impl Authorizer for StaticAuthorizer {
    fn is_privileged(&self, actor: &Actor, channel: Channel) -> bool {
        match channel {
            Channel::Private => true,
            Channel::Group => self.admins.contains(actor.as_str()),
        }
    }
}

/// Gate a handler: `Err` carries the rejection reply.
pub fn guard(authorizer: &dyn Authorizer, ctx: &MessageContext) -> Result<(), Reply> {
    if authorizer.is_privileged(&ctx.actor, ctx.channel) {
        Ok(())
    } else {
        tracing::warn!("Rejected command from {} in group channel", ctx.actor.as_str());
        Err(Reply::text(ADMINS_ONLY))
    }
}
