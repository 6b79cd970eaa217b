//! Study tutor chat with simulated, cancellable replies.
//!
//! Replies are scheduled tasks on a logical millisecond clock owned by the
//! session. Nothing runs in the background: due replies are delivered when
//! the owner calls `tick(now)`, and a closed tutor delivers nothing, so no
//! reply can land after teardown.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};

use directory_store::metrics::{subject_performance, weak_subjects};
use directory_store::Snapshot;

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: TaskId,
    due: u64,
    task: T,
}

/// Deadline queue driven by an external logical clock.
#[derive(Debug)]
pub struct ReplyScheduler<T> {
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for ReplyScheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> ReplyScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to fire `delay_ms` after `now`.
    pub fn schedule(&mut self, now: u64, delay_ms: u64, task: T) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.pending.push(Scheduled {
            id,
            due: now.saturating_add(delay_ms),
            task,
        });
        id
    }

    /// Drop a pending task. `false` if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Drop every pending task; returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Remove and return every task due at or before `now`, in deadline
    /// order (scheduling order breaks ties).
    pub fn advance(&mut self, now: u64) -> Vec<T> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by_key(|s| (s.due, s.id));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.due).min()
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Student,
    Tutor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub author: Author,
    pub content: String,
    /// Logical time in milliseconds.
    pub at: u64,
    pub subject: Option<String>,
}

#[derive(Debug)]
struct PendingReply {
    subject: Option<String>,
}

const GREETING: &str = "Olá! Sou o teu tutor de estudo. Em que disciplina precisas de ajuda hoje?";

/// Opening line and the wording used in place of `{subject}` when no
/// subject is selected.
const OPENERS: [(&str, &str); 4] = [
    (
        "Excelente pergunta sobre {subject}! Vou explicar de forma simples e clara.",
        "este tópico",
    ),
    (
        "Com base no seu desempenho em {subject}, recomendo que foque nestes pontos principais:",
        "esta disciplina",
    ),
    ("Entendo a sua dúvida. Vamos resolver isso passo a passo:", ""),
    ("Esta é uma área importante! Deixe-me ajudar com uma explicação detalhada:", ""),
];

fn opener(index: usize, subject: Option<&str>) -> String {
    let (template, fallback) = OPENERS[index];
    template.replace("{subject}", subject.unwrap_or(fallback))
}

/// Canned reply text: a random opener plus a study plan for `subject`.
pub fn compose_reply(rng: &mut impl Rng, subject: Option<&str>) -> String {
    let intro = opener(rng.random_range(0..OPENERS.len()), subject);
    format!(
        "{intro}\n\n\
         Para {topic}, sugiro:\n\
         1. Revisar os conceitos básicos primeiro\n\
         2. Praticar exercícios semelhantes\n\
         3. Fazer resumos dos pontos principais\n\
         4. Agendar uma sessão de revisão comigo\n\n\
         Precisa de mais esclarecimentos sobre algum ponto específico?",
        topic = subject.unwrap_or("esta matéria"),
    )
}

/// Subject names below `threshold`, weakest first.
pub fn focus_subjects(snapshot: &Snapshot, threshold: f64) -> Vec<String> {
    let ranking = subject_performance(&snapshot.subjects, &snapshot.grades, threshold);
    weak_subjects(&ranking, threshold)
        .into_iter()
        .map(|p| p.name)
        .collect()
}

/// One tutor conversation, owned by a portal session.
pub struct Tutor {
    conversation: Vec<ChatMessage>,
    scheduler: ReplyScheduler<PendingReply>,
    rng: StdRng,
    reply_delay_ms: u64,
    next_message_id: u64,
    closed: bool,
}

impl Tutor {
    /// Tutor with OS-seeded reply selection.
    pub fn new(reply_delay_ms: u64) -> Self {
        Self::with_rng(reply_delay_ms, StdRng::from_os_rng())
    }

    /// Tutor with reproducible reply selection.
    pub fn seeded(reply_delay_ms: u64, seed: u64) -> Self {
        Self::with_rng(reply_delay_ms, StdRng::seed_from_u64(seed))
    }

    fn with_rng(reply_delay_ms: u64, rng: StdRng) -> Self {
        let mut tutor = Self {
            conversation: Vec::new(),
            scheduler: ReplyScheduler::new(),
            rng,
            reply_delay_ms,
            next_message_id: 0,
            closed: false,
        };
        tutor.push(Author::Tutor, GREETING.to_string(), 0, None);
        tutor
    }

    fn push(&mut self, author: Author, content: String, at: u64, subject: Option<String>) {
        self.next_message_id += 1;
        self.conversation.push(ChatMessage {
            id: self.next_message_id,
            author,
            content,
            at,
            subject,
        });
    }

    /// Record a question and schedule the reply. Blank questions and
    /// questions after `close` are ignored.
    pub fn ask(&mut self, now: u64, question: &str, subject: Option<&str>) -> Option<TaskId> {
        let question = question.trim();
        if question.is_empty() || self.closed {
            trace!(closed = self.closed, "tutor question ignored");
            return None;
        }
        let subject = subject.map(str::to_string);
        self.push(Author::Student, question.to_string(), now, subject.clone());
        let id = self
            .scheduler
            .schedule(now, self.reply_delay_ms, PendingReply { subject });
        debug!(task = ?id, due_in_ms = self.reply_delay_ms, "tutor reply scheduled");
        Some(id)
    }

    /// Deliver every reply due by `now`; returns how many were delivered.
    pub fn tick(&mut self, now: u64) -> usize {
        if self.closed {
            return 0;
        }
        let due = self.scheduler.advance(now);
        let delivered = due.len();
        for reply in due {
            let content = compose_reply(&mut self.rng, reply.subject.as_deref());
            self.push(Author::Tutor, content, now, reply.subject);
        }
        delivered
    }

    /// Withdraw a pending reply.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.scheduler.cancel(id)
    }

    /// Cancel everything pending and stop accepting questions.
    pub fn close(&mut self) -> usize {
        self.closed = true;
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "pending tutor replies cancelled");
        }
        cancelled
    }

    pub fn is_typing(&self) -> bool {
        !self.closed && self.scheduler.pending() > 0
    }

    pub fn next_reply_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }
}
