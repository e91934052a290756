//! The single trivia round shared by every chat the bot sits in.
//!
//! All round state and every score change sit behind one mutex. Transitions
//! are computed while holding it and produce a list of messages, which are
//! sent only after the lock is released so a slow chat request never stalls
//! another answer check. Each round carries an id; its expiry task only acts
//! if that same round is still running when the timer fires.
//!
//! A round is played in every channel that asked for it: `/start` from a
//! second channel joins it, and from then on that channel hears everything
//! the first one does, including the rounds that follow.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::chat::ChatSink;
use crate::error::TriviaError;
use crate::trivia::questions::QuestionBank;
use crate::trivia::scores::ScoreLedger;
use crate::trivia::{ChannelId, Sender, UserId};

pub const DEFAULT_ROUND_DURATION: Duration = Duration::from_secs(180);

type Outbox = Vec<(ChannelId, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// No round running, or the message came from a channel that isn't
    /// playing it.
    Ignored,
    Wrong,
    Correct { score: u64 },
}

/// A read-only view of the running round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub id: u64,
    pub question: usize,
    pub wrong_answers: u32,
    pub channels: Vec<ChannelId>,
}

#[derive(Debug)]
struct ActiveRound {
    id: u64,
    question: usize,
    wrong_answers: u32,
    /// In joining order, no duplicates.
    channels: Vec<ChannelId>,
    expiry: JoinHandle<()>,
}

#[derive(Debug)]
enum RoundState {
    Idle,
    Active(ActiveRound),
}

#[derive(Debug)]
struct Shared {
    state: RoundState,
    ledger: ScoreLedger,
    next_round: u64,
}

pub struct RoundEngine {
    bank: QuestionBank,
    chat: Arc<dyn ChatSink>,
    round_duration: Duration,
    shared: Mutex<Shared>,
}

fn broadcast(outbox: &mut Outbox, channels: &[ChannelId], text: String) {
    for channel in channels {
        outbox.push((*channel, text.clone()));
    }
}

impl RoundEngine {
    pub fn new(
        bank: QuestionBank,
        ledger: ScoreLedger,
        chat: Arc<dyn ChatSink>,
        round_duration: Duration,
    ) -> Result<Arc<Self>, TriviaError> {
        if bank.is_empty() {
            return Err(TriviaError::EmptyQuestionBank);
        }

        Ok(Arc::new(Self {
            bank,
            chat,
            round_duration,
            shared: Mutex::new(Shared {
                state: RoundState::Idle,
                ledger,
                next_round: 1,
            }),
        }))
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn round_duration(&self) -> Duration {
        self.round_duration
    }

    pub fn is_active(&self) -> bool {
        matches!(self.lock().state, RoundState::Active(_))
    }

    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        match &self.lock().state {
            RoundState::Idle => None,
            RoundState::Active(round) => Some(RoundSnapshot {
                id: round.id,
                question: round.question,
                wrong_answers: round.wrong_answers,
                channels: round.channels.clone(),
            }),
        }
    }

    pub fn score(&self, user: UserId) -> u64 {
        self.lock().ledger.get(user)
    }

    pub fn player_count(&self) -> usize {
        self.lock().ledger.len()
    }

    pub fn score_entries(&self) -> Vec<(UserId, u64)> {
        self.lock().ledger.entries()
    }

    /// Starts a round in `channel`. While one is already running, `channel`
    /// joins it and gets the question repeated.
    pub async fn start_round(self: &Arc<Self>, channel: ChannelId) {
        let outbox = self.start(channel);
        self.flush(outbox).await;
    }

    pub async fn check_answer(
        self: &Arc<Self>,
        channel_gated: bool,
        channel: ChannelId,
        sender: &Sender,
        text: &str,
    ) -> AnswerOutcome {
        if !channel_gated {
            return AnswerOutcome::Ignored;
        }

        let (outcome, outbox) = self.answer(channel, sender, text);
        self.flush(outbox).await;
        outcome
    }

    fn start(self: &Arc<Self>, channel: ChannelId) -> Outbox {
        let mut shared = self.lock();
        let mut outbox = Outbox::new();

        if let RoundState::Active(round) = &mut shared.state {
            if !round.channels.contains(&channel) {
                log::info!("{:?} joined round {}", channel, round.id);
                round.channels.push(channel);
            }
            outbox.push((channel, self.question_message(round.question)));
            return outbox;
        }

        self.begin_round(&mut shared, vec![channel], &mut outbox);
        outbox
    }

    fn answer(
        self: &Arc<Self>,
        channel: ChannelId,
        sender: &Sender,
        text: &str,
    ) -> (AnswerOutcome, Outbox) {
        let mut shared = self.lock();
        let mut outbox = Outbox::new();

        let won = match std::mem::replace(&mut shared.state, RoundState::Idle) {
            RoundState::Idle => return (AnswerOutcome::Ignored, outbox),
            RoundState::Active(round) if !round.channels.contains(&channel) => {
                log::debug!("Ignoring answer from {:?}, not part of round {}", channel, round.id);
                shared.state = RoundState::Active(round);
                return (AnswerOutcome::Ignored, outbox);
            }
            RoundState::Active(mut round) => {
                if !self.bank[round.question].is_correct(text) {
                    round.wrong_answers += 1;
                    log::debug!(
                        "Wrong answer from {} in round {} ({} so far)",
                        sender.id,
                        round.id,
                        round.wrong_answers
                    );
                    shared.state = RoundState::Active(round);
                    return (AnswerOutcome::Wrong, outbox);
                }
                round
            }
        };

        won.expiry.abort();
        log::info!("Round {} won by {}", won.id, sender.id);

        broadcast(
            &mut outbox,
            &won.channels,
            format!(
                "{} had the correct answer with `{}` after {} wrong answer(s)",
                sender.name,
                text.trim(),
                won.wrong_answers
            ),
        );
        let score = shared.ledger.increment(sender.id);
        broadcast(
            &mut outbox,
            &won.channels,
            format!("{} now has {} point(s)!", sender.name, score),
        );

        self.begin_round(&mut shared, won.channels, &mut outbox);
        (AnswerOutcome::Correct { score }, outbox)
    }

    /// Called by the expiry task of round `id`.
    fn expire(self: &Arc<Self>, id: u64) -> Outbox {
        let mut shared = self.lock();
        let mut outbox = Outbox::new();

        let expired = match std::mem::replace(&mut shared.state, RoundState::Idle) {
            RoundState::Active(round) if round.id == id => round,
            other => {
                shared.state = other;
                return outbox;
            }
        };

        let question = &self.bank[expired.question];
        broadcast(
            &mut outbox,
            &expired.channels,
            format!(
                "Time ran out!\nThe correct answer was `{}`",
                question.canonical_answer()
            ),
        );

        if expired.wrong_answers > 0 {
            log::info!(
                "Round {} expired after {} wrong answer(s)",
                expired.id,
                expired.wrong_answers
            );
            self.begin_round(&mut shared, expired.channels, &mut outbox);
        } else {
            log::info!("Round {} expired with no answers, waiting for /start", expired.id);
        }
        outbox
    }

    fn begin_round(
        self: &Arc<Self>,
        shared: &mut Shared,
        channels: Vec<ChannelId>,
        outbox: &mut Outbox,
    ) {
        let question = self.bank.pick_random();
        let id = shared.next_round;
        shared.next_round += 1;

        broadcast(
            outbox,
            &channels,
            format!(
                "A new question, you have {} seconds to answer it!",
                self.round_duration.as_secs()
            ),
        );
        broadcast(outbox, &channels, self.question_message(question));

        log::info!("Round {} started with question {}", id, question);
        shared.state = RoundState::Active(ActiveRound {
            id,
            question,
            wrong_answers: 0,
            channels,
            expiry: self.arm_expiry(id),
        });
    }

    fn arm_expiry(self: &Arc<Self>, id: u64) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(engine.round_duration).await;
            let outbox = engine.expire(id);
            engine.flush(outbox).await;
        })
    }

    fn question_message(&self, question: usize) -> String {
        format!("The question is:\n{}", self.bank[question].prompt)
    }

    async fn flush(&self, outbox: Outbox) {
        for (channel, text) in outbox {
            if let Err(err) = self.chat.send_message(channel, &text).await {
                log::warn!("Failed to send message to {:?}: {}", channel, err);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}
