// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process event bus.
//!
//! A [`Publisher`] delivers identified [`Event`]s to [`Subscriber`]s whose
//! subscription contains the event identity, in descending priority
//! (stable on ties), until one of them closes the event by returning true.
//!
//! Subscribers come in three lifetimes:
//! - managed: the publisher shares ownership (`Arc`)
//! - casual: the publisher only holds a `Weak`; pruned once the owner drops it
//! - external: a plain reference the caller keeps alive
//!
//! The roster is guarded by one mutex; callbacks always run outside of it,
//! on the publishing thread, with strong handles held for the whole
//! callback window.
//!
//! Subscribers answer through the event's [`PostBox`], a multi-producer
//! reverse channel back to whoever published.

use crate::error::EventError;
use crate::guid::Guid;
use crate::ident::Ident;
use crate::setting::{Setting, SettingList};
use crate::value::Value;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Lifecycle signal read from a subscriber on every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Normal delivery.
    #[default]
    Issue,
    /// Skip without removing.
    Suspend,
    /// Re-run attach/start and re-enqueue.
    Renew,
    /// Remove the subscription.
    Discontinue,
}

/// Receiver side of the bus.
pub trait Subscriber: Send + Sync {
    fn ident(&self) -> &Ident;

    /// Event identities of interest; empty means inactive.
    fn subscription(&self) -> Vec<Ident>;

    /// Handle an event; true closes it for lower-priority subscribers.
    fn receive(&self, event: &Event) -> bool;

    /// Higher receives earlier.
    fn priority(&self) -> i32 {
        0
    }

    fn action(&self) -> Action {
        Action::Issue
    }

    /// One-shot environment check; false reports a problem.
    fn audit(&self) -> bool {
        true
    }

    fn attach(&self) {}

    fn start(&self) {}

    fn stop(&self) {}
}

/// Event payload: identity, settings, optional reply channel and
/// transaction stamp.
#[derive(Debug, Clone)]
pub struct Event {
    ident: Ident,
    payload: SettingList,
    post_box: Option<Arc<PostBox>>,
    transaction: Option<Guid>,
}

impl Event {
    pub fn new(ident: impl Into<Ident>) -> Self {
        Self {
            ident: ident.into(),
            payload: SettingList::new(),
            post_box: None,
            transaction: None,
        }
    }

    /// Builder: append one anonymous single-value setting.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.payload
            .push(Setting::from_values(Ident::anonymous(), vec![value.into()]));
        self
    }

    pub fn with_setting(mut self, setting: Setting) -> Self {
        self.payload.push(setting);
        self
    }

    pub fn with_payload(mut self, payload: SettingList) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_post_box(mut self, post_box: Arc<PostBox>) -> Self {
        self.post_box = Some(post_box);
        self
    }

    pub fn with_transaction(mut self, id: Guid) -> Self {
        self.transaction = Some(id);
        self
    }

    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    pub fn payload(&self) -> &SettingList {
        &self.payload
    }

    /// First value of the first setting.
    pub fn value(&self) -> Option<&Value> {
        self.payload.first()?.first()
    }

    pub fn post_box(&self) -> Option<&Arc<PostBox>> {
        self.post_box.as_ref()
    }

    pub fn transaction(&self) -> Option<Guid> {
        self.transaction
    }

    /// Post a reply; false when the event has no post box.
    pub fn reply(&self, message: Message) -> bool {
        self.post_box.as_ref().is_some_and(|pb| pb.post(message))
    }
}

/// Reply sent back through a [`PostBox`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    sender: Ident,
    payload: SettingList,
}

impl Message {
    pub fn new(sender: impl Into<Ident>) -> Self {
        Self {
            sender: sender.into(),
            payload: SettingList::new(),
        }
    }

    /// Builder: append one anonymous single-value setting.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.payload
            .push(Setting::from_values(Ident::anonymous(), vec![value.into()]));
        self
    }

    pub fn with_setting(mut self, setting: Setting) -> Self {
        self.payload.push(setting);
        self
    }

    pub fn sender(&self) -> &Ident {
        &self.sender
    }

    pub fn payload(&self) -> &SettingList {
        &self.payload
    }

    /// First value of the first setting.
    pub fn value(&self) -> Option<&Value> {
        self.payload.first()?.first()
    }
}

/// Multi-producer reverse channel from subscribers to the publisher side.
#[derive(Debug)]
pub struct PostBox {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl PostBox {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Shared post box ready to attach to events.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn post(&self, message: Message) -> bool {
        self.tx.send(message).is_ok()
    }

    /// Next message, if any, without blocking.
    pub fn try_take(&self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Every message currently queued.
    pub fn drain(&self) -> Vec<Message> {
        self.rx.try_iter().collect()
    }

    /// Block up to `timeout` for the next message.
    pub fn wait(&self, timeout: Duration) -> Option<Message> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for PostBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber counts per lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Census {
    pub managed: usize,
    pub casual: usize,
    pub external: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.managed + self.casual + self.external
    }
}

/// Strong handle held for a callback window.
enum Handle<'a> {
    Shared(Arc<dyn Subscriber>),
    External(&'a dyn Subscriber),
}

impl<'a> Deref for Handle<'a> {
    type Target = dyn Subscriber + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            Handle::Shared(s) => s.as_ref(),
            Handle::External(s) => *s,
        }
    }
}

#[derive(Default)]
struct Roster<'a> {
    managed: Vec<Arc<dyn Subscriber>>,
    casual: Vec<Weak<dyn Subscriber>>,
    external: Vec<&'a dyn Subscriber>,
}

/// What the dispatcher decided for one subscriber.
enum Verdict {
    Keep,
    Pool,
    Renew,
    Drop,
}

/// `event` is `None` for lifecycle broadcasts, which also reach suspended
/// subscribers.
fn judge(subscriber: &dyn Subscriber, event: Option<&Event>) -> Verdict {
    match (subscriber.action(), event) {
        (Action::Discontinue, _) => Verdict::Drop,
        (Action::Renew, _) => Verdict::Renew,
        (_, None) => Verdict::Pool,
        (Action::Suspend, Some(_)) => Verdict::Keep,
        (Action::Issue, Some(event)) => {
            if subscriber.subscription().iter().any(|i| i == event.ident()) {
                Verdict::Pool
            } else {
                Verdict::Keep
            }
        }
    }
}

impl<'a> Roster<'a> {
    fn contains(&self, ident: &Ident) -> bool {
        self.managed.iter().any(|s| s.ident() == ident)
            || self
                .casual
                .iter()
                .filter_map(Weak::upgrade)
                .any(|s| s.ident() == ident)
            || self.external.iter().any(|s| s.ident() == ident)
    }

    /// Apply actions and collect the subscribers to call. `None` collects
    /// every active subscriber (lifecycle broadcasts).
    fn sweep(&mut self, event: Option<&Event>) -> (Vec<Handle<'a>>, Vec<Handle<'a>>) {
        let mut pool = Vec::new();
        let mut renewed = Vec::new();

        let mut managed_renewed = Vec::new();
        self.managed.retain(|s| match judge(s.as_ref(), event) {
            Verdict::Keep => true,
            Verdict::Pool => {
                pool.push(Handle::Shared(Arc::clone(s)));
                true
            }
            Verdict::Renew => {
                managed_renewed.push(Arc::clone(s));
                false
            }
            Verdict::Drop => false,
        });
        for s in managed_renewed {
            renewed.push(Handle::Shared(Arc::clone(&s)));
            self.managed.push(s);
        }

        let mut casual_renewed = Vec::new();
        self.casual.retain(|weak| {
            let Some(s) = weak.upgrade() else {
                return false;
            };
            match judge(s.as_ref(), event) {
                Verdict::Keep => true,
                Verdict::Pool => {
                    pool.push(Handle::Shared(s));
                    true
                }
                Verdict::Renew => {
                    casual_renewed.push(s);
                    false
                }
                Verdict::Drop => false,
            }
        });
        for s in casual_renewed {
            self.casual.push(Arc::downgrade(&s));
            renewed.push(Handle::Shared(s));
        }

        let mut external_renewed = Vec::new();
        self.external.retain(|&s| match judge(s, event) {
            Verdict::Keep => true,
            Verdict::Pool => {
                pool.push(Handle::External(s));
                true
            }
            Verdict::Renew => {
                external_renewed.push(s);
                false
            }
            Verdict::Drop => false,
        });
        for s in external_renewed {
            self.external.push(s);
            renewed.push(Handle::External(s));
        }

        (pool, renewed)
    }
}

/// Dispatches events to subscribers.
pub struct Publisher<'a> {
    ident: Ident,
    roster: Mutex<Roster<'a>>,
}

impl<'a> Publisher<'a> {
    pub fn new(ident: impl Into<Ident>) -> Self {
        Self {
            ident: ident.into(),
            roster: Mutex::new(Roster::default()),
        }
    }

    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Publisher shares ownership of the subscriber.
    pub fn add_managed(&self, subscriber: Arc<dyn Subscriber>) -> Result<(), EventError> {
        let mut roster = self.roster.lock();
        Self::check_duplicate(&roster, subscriber.ident())?;
        log::debug!("[Publisher::add_managed] {}", subscriber.ident());
        roster.managed.push(subscriber);
        Ok(())
    }

    /// Publisher only observes; the subscriber goes away with its last `Arc`.
    pub fn add_casual(&self, subscriber: &Arc<dyn Subscriber>) -> Result<(), EventError> {
        let mut roster = self.roster.lock();
        Self::check_duplicate(&roster, subscriber.ident())?;
        log::debug!("[Publisher::add_casual] {}", subscriber.ident());
        roster.casual.push(Arc::downgrade(subscriber));
        Ok(())
    }

    /// Caller keeps ownership for at least the publisher's lifetime.
    pub fn add_external(&self, subscriber: &'a dyn Subscriber) -> Result<(), EventError> {
        let mut roster = self.roster.lock();
        Self::check_duplicate(&roster, subscriber.ident())?;
        log::debug!("[Publisher::add_external] {}", subscriber.ident());
        roster.external.push(subscriber);
        Ok(())
    }

    fn check_duplicate(roster: &Roster<'a>, ident: &Ident) -> Result<(), EventError> {
        if roster.contains(ident) {
            log::warn!("[Publisher::add] duplicate subscriber {}", ident);
            return Err(EventError::Duplicate(ident.to_string()));
        }
        Ok(())
    }

    /// Remove every subscriber matching `ident`; returns how many went.
    pub fn remove(&self, ident: &Ident) -> usize {
        let mut roster = self.roster.lock();
        let mut removed = 0;
        let mut keep = |other: &Ident| {
            let matched = other == ident;
            removed += usize::from(matched);
            !matched
        };
        roster.managed.retain(|s| keep(s.ident()));
        // Expired casual references go too, without counting.
        roster
            .casual
            .retain(|w| w.upgrade().is_some_and(|s| keep(s.ident())));
        roster.external.retain(|s| keep(s.ident()));
        removed
    }

    /// Deliver `event`; returns whether a subscriber closed it.
    pub fn publish(&self, event: &Event) -> bool {
        let (mut pool, renewed) = self.roster.lock().sweep(Some(event));
        Self::renew(&renewed);

        pool.sort_by(|a, b| b.priority().cmp(&a.priority()));
        for subscriber in &pool {
            if subscriber.receive(event) {
                log::trace!(
                    "[Publisher::publish] {} closed by {}",
                    event.ident(),
                    subscriber.ident()
                );
                return true;
            }
        }
        false
    }

    /// Re-run attach/start for subscribers that asked for renewal.
    fn renew(renewed: &[Handle<'a>]) {
        for subscriber in renewed {
            log::debug!("[Publisher::renew] {}", subscriber.ident());
            subscriber.attach();
            subscriber.start();
        }
    }

    /// Every subscriber still on the roster, suspended ones included.
    /// Renewals run first and the renewed take part in the broadcast.
    fn active(&self) -> Vec<Handle<'a>> {
        let (mut pool, renewed) = self.roster.lock().sweep(None);
        Self::renew(&renewed);
        pool.extend(renewed);
        pool
    }

    /// Ask every active subscriber to audit; true when all pass.
    pub fn audit(&self) -> bool {
        let mut passed = true;
        for subscriber in self.active() {
            if !subscriber.audit() {
                log::warn!("[Publisher::audit] {} failed audit", subscriber.ident());
                passed = false;
            }
        }
        passed
    }

    pub fn attach(&self) {
        for subscriber in self.active() {
            subscriber.attach();
        }
    }

    pub fn start(&self) {
        for subscriber in self.active() {
            subscriber.start();
        }
    }

    pub fn stop(&self) {
        for subscriber in self.active() {
            subscriber.stop();
        }
    }

    /// Live subscribers per lifetime.
    pub fn census(&self) -> Census {
        let roster = self.roster.lock();
        Census {
            managed: roster.managed.len(),
            casual: roster.casual.iter().filter(|w| w.strong_count() > 0).count(),
            external: roster.external.len(),
        }
    }

    /// Drop expired casual references; returns how many went.
    pub fn prune(&self) -> usize {
        let mut roster = self.roster.lock();
        let before = roster.casual.len();
        roster.casual.retain(|w| w.strong_count() > 0);
        before - roster.casual.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

    struct Counter {
        ident: Ident,
        topic: Ident,
        priority: i32,
        closes: bool,
        action: AtomicU8,
        received: AtomicUsize,
        started: AtomicUsize,
        stopped: AtomicUsize,
        log: Option<Arc<Mutex<Vec<String>>>>,
    }

    impl Counter {
        fn new(name: &str, priority: i32, closes: bool) -> Self {
            Self {
                ident: Ident::named(name),
                topic: Ident::named("tick"),
                priority,
                closes,
                action: AtomicU8::new(0),
                received: AtomicUsize::new(0),
                started: AtomicUsize::new(0),
                stopped: AtomicUsize::new(0),
                log: None,
            }
        }

        fn logging(mut self, log: &Arc<Mutex<Vec<String>>>) -> Self {
            self.log = Some(Arc::clone(log));
            self
        }

        fn set_action(&self, action: Action) {
            let code = match action {
                Action::Issue => 0,
                Action::Suspend => 1,
                Action::Renew => 2,
                Action::Discontinue => 3,
            };
            self.action.store(code, Ordering::SeqCst);
        }
    }

    impl Subscriber for Counter {
        fn ident(&self) -> &Ident {
            &self.ident
        }

        fn subscription(&self) -> Vec<Ident> {
            vec![self.topic.clone()]
        }

        fn receive(&self, _event: &Event) -> bool {
            self.received.fetch_add(1, Ordering::SeqCst);
            if let Some(log) = &self.log {
                log.lock().push(self.ident.to_string());
            }
            self.closes
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn action(&self) -> Action {
            match self.action.load(Ordering::SeqCst) {
                1 => Action::Suspend,
                2 => Action::Renew,
                3 => Action::Discontinue,
                _ => Action::Issue,
            }
        }

        fn start(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            // one renewal only
            self.set_action(Action::Issue);
        }

        fn stop(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tick() -> Event {
        Event::new("tick")
    }

    #[test]
    fn test_priority_order_and_stable_ties() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let publisher = Publisher::new("pub");
        for (name, priority) in [("low", 1), ("high-a", 5), ("mid", 3), ("high-b", 5)] {
            publisher
                .add_managed(Arc::new(Counter::new(name, priority, false).logging(&log)))
                .expect("add");
        }
        assert!(!publisher.publish(&tick()));
        assert_eq!(*log.lock(), ["high-a", "high-b", "mid", "low"]);
    }

    #[test]
    fn test_closing_stops_lower_priorities() {
        let publisher = Publisher::new("pub");
        let high = Arc::new(Counter::new("high", 10, true));
        let low = Arc::new(Counter::new("low", 1, false));
        publisher.add_managed(high.clone()).expect("add");
        publisher.add_managed(low.clone()).expect("add");
        assert!(publisher.publish(&tick()));
        assert_eq!(high.received.load(Ordering::SeqCst), 1);
        assert_eq!(low.received.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_filter() {
        let publisher = Publisher::new("pub");
        let counter = Arc::new(Counter::new("p", 0, false));
        publisher.add_managed(counter.clone()).expect("add");
        publisher.publish(&Event::new("other"));
        assert_eq!(counter.received.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicates_rejected_across_lists() {
        let publisher = Publisher::new("pub");
        let casual: Arc<dyn Subscriber> = Arc::new(Counter::new("same", 0, false));
        publisher.add_casual(&casual).expect("add");
        let err = publisher
            .add_managed(Arc::new(Counter::new("same", 0, false)))
            .expect_err("duplicate");
        assert_eq!(err, EventError::Duplicate("same".into()));
    }

    #[test]
    fn test_casual_subscribers_are_pruned() {
        let publisher = Publisher::new("pub");
        let casual: Arc<dyn Subscriber> = Arc::new(Counter::new("c", 0, false));
        publisher.add_casual(&casual).expect("add");
        assert_eq!(publisher.census().casual, 1);
        drop(casual);
        assert_eq!(publisher.census().casual, 0);
        assert_eq!(publisher.prune(), 1);
        assert_eq!(publisher.prune(), 0);
    }

    #[test]
    fn test_suspend_discontinue_renew() {
        let publisher = Publisher::new("pub");
        let counter = Arc::new(Counter::new("p", 0, false));
        publisher.add_managed(counter.clone()).expect("add");

        counter.set_action(Action::Suspend);
        publisher.publish(&tick());
        assert_eq!(counter.received.load(Ordering::SeqCst), 0);
        assert_eq!(publisher.census().managed, 1);

        counter.set_action(Action::Renew);
        publisher.publish(&tick());
        assert_eq!(counter.started.load(Ordering::SeqCst), 1);
        assert_eq!(counter.received.load(Ordering::SeqCst), 0);
        publisher.publish(&tick());
        assert_eq!(counter.received.load(Ordering::SeqCst), 1);

        counter.set_action(Action::Discontinue);
        publisher.publish(&tick());
        assert_eq!(publisher.census().managed, 0);
    }

    #[test]
    fn test_lifecycle_broadcast_renews_and_reaches_suspended() {
        let publisher = Publisher::new("pub");
        let renewing = Arc::new(Counter::new("r", 0, false));
        let suspended = Arc::new(Counter::new("s", 0, false));
        publisher.add_managed(renewing.clone()).expect("add");
        publisher.add_managed(suspended.clone()).expect("add");
        renewing.set_action(Action::Renew);
        suspended.set_action(Action::Suspend);

        publisher.stop();
        assert_eq!(renewing.started.load(Ordering::SeqCst), 1);
        assert_eq!(renewing.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(suspended.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(publisher.census().managed, 2);

        publisher.publish(&tick());
        assert_eq!(renewing.received.load(Ordering::SeqCst), 1);
        assert_eq!(suspended.received.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_external_and_remove() {
        let external = Counter::new("ext", 0, true);
        let publisher = Publisher::new("pub");
        publisher.add_external(&external).expect("add");
        assert!(publisher.publish(&tick()));
        assert_eq!(publisher.remove(&Ident::named("ext")), 1);
        assert!(!publisher.publish(&tick()));
        assert_eq!(publisher.census().total(), 0);
    }

    #[test]
    fn test_post_box_round_trip() {
        let post_box = PostBox::shared();
        let event = tick().with_post_box(post_box.clone()).with_value(3i64);
        assert_eq!(event.value().and_then(Value::as_int), Some(3));
        assert!(event.reply(Message::new("p").with_value("ok")));
        assert!(event.reply(Message::new("q")));
        assert_eq!(post_box.len(), 2);
        let first = post_box.try_take().expect("first");
        assert_eq!(first.value().and_then(|v| v.text()), Some("ok"));
        assert_eq!(post_box.drain().len(), 1);
        assert!(post_box.wait(Duration::from_millis(1)).is_none());
    }
}
