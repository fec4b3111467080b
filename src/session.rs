//! Session-scoped mail store.
//!
//! One session per logged-in user. The session owns its copy of the item
//! collection and hands it, together with the acting user, to the pure
//! filtering/aggregation functions; nothing here reads ambient state, and
//! collections are never shared across sessions.

use crate::config::Config;
use crate::demo;
use crate::filter::{self, InboxQuery};
use crate::intake::{self, RecognizedEnvelope};
use crate::model::{MailItem, User};
use crate::review::{self, ReviewAction, ReviewError};
use crate::statistics::{self, GlobalStats, OperatorStats};

pub struct Session {
    user: User,
    config: Config,
    items: Vec<MailItem>,
    next_seq: u64,
}

impl Session {
    /// Start an empty session for a logged-in user.
    pub fn login(user: User, config: Config) -> Self {
        log::info!(
            "session started for {} ({}, {})",
            user.name,
            user.role,
            user.center
        );
        Session {
            user,
            config,
            items: Vec::new(),
            next_seq: 1,
        }
    }

    /// Start a session preloaded with the demo dataset.
    pub fn seeded(user: User, config: Config) -> Self {
        let items = demo::seed_items(&config);
        let next_seq = demo::SEED_START + items.len() as u64;
        log::info!("session seeded with {} demo items", items.len());
        Session {
            user,
            config,
            items,
            next_seq,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The full collection, unscoped. Views go through [`Session::visible`].
    pub fn items(&self) -> &[MailItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&MailItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Ingest a recognized envelope scanned by the session user and append
    /// it to the collection. Returns the new item's id.
    pub fn scan(&mut self, envelope: RecognizedEnvelope) -> String {
        let mut item = intake::ingest(envelope, &self.user, &self.config, self.next_seq);
        self.next_seq += 1;
        intake::submit(&mut item, &self.user);
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Run the review state machine against one item on behalf of the
    /// session user.
    pub fn apply(&mut self, item_id: &str, action: ReviewAction) -> Result<(), ReviewError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ReviewError::UnknownItem(item_id.to_string()))?;
        review::apply_action(item, &self.user, action)
    }

    /// Items the session user may see, role-scoped.
    pub fn visible(&self) -> Vec<&MailItem> {
        filter::visible_items(&self.items, &self.user)
    }

    /// Role-scope first, then the inbox filter chain, mirroring the inbox
    /// page's call order.
    pub fn inbox(&self, query: &InboxQuery) -> Vec<&MailItem> {
        self.visible()
            .into_iter()
            .filter(|item| query.matches(item))
            .collect()
    }

    /// Per-operator performance over the visible subset.
    pub fn performance(&self) -> Vec<OperatorStats> {
        statistics::operator_performance(self.visible(), self.config.auto_approve_threshold)
    }

    /// Dashboard/analytics rollup over the visible subset.
    pub fn stats(&self) -> GlobalStats {
        GlobalStats::collect(self.visible(), self.config.auto_approve_threshold)
    }

    /// Operator names for the inbox filter dropdown, over the visible
    /// subset.
    pub fn operators(&self) -> Vec<String> {
        filter::unique_operators(self.visible())
    }
}
