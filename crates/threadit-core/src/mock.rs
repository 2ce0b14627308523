//! In-memory, scriptable [`ChatPlatform`] for tests.
//!
//! Records every call in order. Failures are queued per operation with
//! [`MockPlatform::fail_next`]; attachment failures are keyed by filename;
//! [`MockPlatform::panic_on`] makes an operation panic to exercise the
//! relay's containment.
//!
//! # Example
//! ```rust,ignore
//! let mock = MockPlatform::new();
//! mock.insert_message(fixtures::parent(2, "hello"));
//! relay.process(&fixtures::reply(1, 2)).await;
//! assert_eq!(mock.calls_of(Op::CreateThread).len(), 1);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use threadit_types::{
    AttachmentSnapshot, ChannelRef, MessageSnapshot, PermissionSet, PlatformError, SentMessage,
    ThreadHandle,
};

use crate::platform::{ChatPlatform, OutgoingMessage};

/// Operation kinds, for scripting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchMessage,
    DeleteMessage,
    SendMessage,
    CreateThread,
    AddThreadMember,
    FetchAttachment,
}

/// A recorded platform call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchMessage {
        channel_id: u64,
        message_id: u64,
    },
    DeleteMessage {
        channel_id: u64,
        message_id: u64,
    },
    SendMessage {
        channel_id: u64,
        message: OutgoingMessage,
    },
    CreateThread {
        channel_id: u64,
        message_id: u64,
        name: String,
        auto_archive_minutes: u16,
    },
    AddThreadMember {
        thread_id: u64,
        user_id: u64,
    },
    FetchAttachment {
        filename: String,
    },
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Self::FetchMessage { .. } => Op::FetchMessage,
            Self::DeleteMessage { .. } => Op::DeleteMessage,
            Self::SendMessage { .. } => Op::SendMessage,
            Self::CreateThread { .. } => Op::CreateThread,
            Self::AddThreadMember { .. } => Op::AddThreadMember,
            Self::FetchAttachment { .. } => Op::FetchAttachment,
        }
    }

    /// True for calls that change remote state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self.op(),
            Op::DeleteMessage | Op::SendMessage | Op::CreateThread | Op::AddThreadMember
        )
    }
}

#[derive(Clone)]
pub struct MockPlatform {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    messages: HashMap<u64, MessageSnapshot>,
    attachment_data: HashMap<String, Vec<u8>>,
    attachment_failures: HashMap<String, PlatformError>,
    failures: HashMap<Op, VecDeque<PlatformError>>,
    panics: HashSet<Op>,
    permissions: Option<PermissionSet>,
    calls: Vec<Call>,
    next_id: u64,
}

impl MockPlatform {
    /// Empty platform where the bot holds every capability.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                messages: HashMap::new(),
                attachment_data: HashMap::new(),
                attachment_failures: HashMap::new(),
                failures: HashMap::new(),
                panics: HashSet::new(),
                permissions: Some(PermissionSet::all()),
                calls: Vec::new(),
                next_id: 10_000,
            })),
        }
    }

    /// Make a message fetchable (and deletable) by id.
    pub fn insert_message(&self, message: MessageSnapshot) {
        self.inner
            .lock()
            .unwrap()
            .messages
            .insert(message.id, message);
    }

    pub fn has_message(&self, message_id: u64) -> bool {
        self.inner.lock().unwrap().messages.contains_key(&message_id)
    }

    pub fn message(&self, message_id: u64) -> Option<MessageSnapshot> {
        self.inner.lock().unwrap().messages.get(&message_id).cloned()
    }

    /// Bytes returned for the attachment at `url`. Defaults to the filename's bytes.
    pub fn set_attachment_data(&self, url: impl Into<String>, data: Vec<u8>) {
        self.inner
            .lock()
            .unwrap()
            .attachment_data
            .insert(url.into(), data);
    }

    /// Every fetch of the attachment named `filename` fails with `err`.
    pub fn fail_attachment(&self, filename: impl Into<String>, err: PlatformError) {
        self.inner
            .lock()
            .unwrap()
            .attachment_failures
            .insert(filename.into(), err);
    }

    /// Queue `err` for the next call of `op`. Queued errors are consumed in order.
    pub fn fail_next(&self, op: Op, err: PlatformError) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Every call of `op` panics.
    pub fn panic_on(&self, op: Op) {
        self.inner.lock().unwrap().panics.insert(op);
    }

    pub fn clear_panics(&self) {
        self.inner.lock().unwrap().panics.clear();
    }

    /// `None` simulates a bot member that cannot be resolved.
    pub fn set_permissions(&self, permissions: Option<PermissionSet>) {
        self.inner.lock().unwrap().permissions = permissions;
    }

    /// Snapshot of all recorded calls in call order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn calls_of(&self, op: Op) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op() == op).collect()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// Messages sent so far, with their target channel.
    pub fn sent_messages(&self) -> Vec<(u64, OutgoingMessage)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendMessage {
                    channel_id,
                    message,
                } => Some((channel_id, message)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    fn enter(&self, call: Call) -> Result<(), PlatformError> {
        let op = call.op();
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if inner.panics.contains(&op) {
            // release the lock first so the mock stays usable after the panic
            drop(inner);
            panic!("injected panic in {:?}", op);
        }
        match inner.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        inner.next_id
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPlatform for MockPlatform {
    async fn fetch_message(
        &self,
        channel: &ChannelRef,
        message_id: u64,
    ) -> Result<MessageSnapshot, PlatformError> {
        self.enter(Call::FetchMessage {
            channel_id: channel.id,
            message_id,
        })?;
        self.message(message_id)
            .ok_or_else(|| PlatformError::NotFound("Unknown Message".to_string()))
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        self.enter(Call::DeleteMessage {
            channel_id,
            message_id,
        })?;
        match self.inner.lock().unwrap().messages.remove(&message_id) {
            Some(_) => Ok(()),
            None => Err(PlatformError::NotFound("Unknown Message".to_string())),
        }
    }

    async fn send_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<SentMessage, PlatformError> {
        self.enter(Call::SendMessage {
            channel_id,
            message,
        })?;
        Ok(SentMessage {
            id: self.next_id(),
            channel_id,
        })
    }

    async fn create_thread(
        &self,
        channel_id: u64,
        message_id: u64,
        name: &str,
        auto_archive_minutes: u16,
    ) -> Result<ThreadHandle, PlatformError> {
        self.enter(Call::CreateThread {
            channel_id,
            message_id,
            name: name.to_string(),
            auto_archive_minutes,
        })?;
        let thread = ThreadHandle {
            id: self.next_id(),
            name: name.to_string(),
            parent_channel_id: channel_id,
        };
        if let Some(parent) = self.inner.lock().unwrap().messages.get_mut(&message_id) {
            parent.thread = Some(thread.clone());
        }
        Ok(thread)
    }

    async fn add_thread_member(&self, thread_id: u64, user_id: u64) -> Result<(), PlatformError> {
        self.enter(Call::AddThreadMember { thread_id, user_id })
    }

    async fn fetch_attachment(
        &self,
        attachment: &AttachmentSnapshot,
    ) -> Result<Vec<u8>, PlatformError> {
        self.enter(Call::FetchAttachment {
            filename: attachment.filename.clone(),
        })?;
        let inner = self.inner.lock().unwrap();
        if let Some(err) = inner.attachment_failures.get(&attachment.filename) {
            return Err(err.clone());
        }
        Ok(inner
            .attachment_data
            .get(&attachment.url)
            .cloned()
            .unwrap_or_else(|| attachment.filename.as_bytes().to_vec()))
    }

    fn bot_permissions(&self, _channel: &ChannelRef) -> Option<PermissionSet> {
        self.inner.lock().unwrap().permissions.clone()
    }
}

/// Ready-made snapshots shared by the pipeline tests.
pub mod fixtures {
    use threadit_types::{
        AttachmentSnapshot, ChannelKind, ChannelRef, EmbedSnapshot, MessageKind, MessageSnapshot,
        ThreadHandle, UserSnapshot,
    };

    pub const GUILD_ID: u64 = 100;
    pub const CHANNEL_ID: u64 = 10;
    pub const AUTHOR_ID: u64 = 42;
    pub const BOT_ID: u64 = 999;

    pub fn user(id: u64, name: &str) -> UserSnapshot {
        UserSnapshot {
            id,
            username: name.to_lowercase(),
            display_name: name.to_string(),
            avatar_url: Some(format!("https://cdn.example/avatars/{}.png", id)),
            bot: false,
        }
    }

    pub fn guild_channel() -> ChannelRef {
        ChannelRef {
            id: CHANNEL_ID,
            guild_id: Some(GUILD_ID),
            kind: ChannelKind::GuildText,
            name: Some("general".to_string()),
        }
    }

    /// Plain guild message that replies can point at.
    pub fn parent(id: u64, content: &str) -> MessageSnapshot {
        MessageSnapshot {
            id,
            channel: guild_channel(),
            author: user(7, "Bob"),
            content: content.to_string(),
            kind: MessageKind::Regular,
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
            attachments: vec![],
            embeds: vec![],
            referenced_message_id: None,
            thread: None,
        }
    }

    /// Parent that already has a thread started from it.
    pub fn parent_with_thread(id: u64, thread_id: u64) -> MessageSnapshot {
        let mut msg = parent(id, "already threaded");
        msg.thread = Some(ThreadHandle {
            id: thread_id,
            name: "existing".to_string(),
            parent_channel_id: CHANNEL_ID,
        });
        msg
    }

    /// Guild reply from Alice to `parent_id`.
    pub fn reply(id: u64, parent_id: u64) -> MessageSnapshot {
        MessageSnapshot {
            id,
            channel: guild_channel(),
            author: user(AUTHOR_ID, "Alice"),
            content: "I have thoughts".to_string(),
            kind: MessageKind::Reply,
            timestamp: "2024-01-01T00:05:00+00:00".to_string(),
            attachments: vec![],
            embeds: vec![],
            referenced_message_id: Some(parent_id),
            thread: None,
        }
    }

    pub fn dm_reply(id: u64, parent_id: u64) -> MessageSnapshot {
        let mut msg = reply(id, parent_id);
        msg.channel = ChannelRef::direct(55);
        msg
    }

    pub fn attachment(id: u64, filename: &str) -> AttachmentSnapshot {
        AttachmentSnapshot {
            id,
            filename: filename.to_string(),
            url: format!("https://cdn.example/attachments/{}/{}", id, filename),
            description: Some(format!("{} description", filename)),
            content_type: Some("image/png".to_string()),
            size: 1024,
        }
    }

    pub fn link_embed(title: &str) -> EmbedSnapshot {
        EmbedSnapshot {
            title: Some(title.to_string()),
            url: Some("https://example.com".to_string()),
            ..EmbedSnapshot::default()
        }
    }

    /// "started a thread" notice posted as `author_id`.
    pub fn thread_created_notice(id: u64, author_id: u64) -> MessageSnapshot {
        let mut msg = parent(id, "");
        msg.kind = MessageKind::ThreadCreated;
        msg.author = user(author_id, "Thread It");
        msg.author.bot = author_id == BOT_ID;
        msg.referenced_message_id = Some(123);
        msg
    }
}
