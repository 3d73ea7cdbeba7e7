use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::Mutex;

use crate::api::{ClassifiedMessage, LabelChange, MailClient, MessageSummary};
use crate::classifier::{ClassifierClient, ClassifyItem, Verdicts};
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::notify::NotificationSink;
use crate::store::InboxStore;

use super::cache::{self, CACHE_LIMIT, CacheRecord, FRESHNESS_WINDOW};
use super::retry::{self, RetryPolicy};

pub const UNREAD_WINDOW_DAYS: u32 = 30;
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub use_snippet: bool,
    pub since_days: u32,
    pub cache_limit: usize,
    pub freshness: Duration,
    pub mail_timeout: Duration,
    pub classifier_timeout: Duration,
    pub notify_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            use_snippet: false,
            since_days: UNREAD_WINDOW_DAYS,
            cache_limit: CACHE_LIMIT,
            freshness: FRESHNESS_WINDOW,
            mail_timeout: Duration::from_secs(10),
            classifier_timeout: Duration::from_secs(45),
            notify_timeout: NOTIFY_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            use_snippet: settings.use_snippet,
            mail_timeout: settings.request_timeout(),
            classifier_timeout: settings.classifier_timeout(),
            ..Self::default()
        }
    }
}

// Label changes leave the cache alone. A later refresh whose listing is
// complete drops messages that are no longer unread.
pub struct InboxSync {
    mail: Arc<dyn MailClient>,
    classifier: Arc<dyn ClassifierClient>,
    notifier: Arc<dyn NotificationSink>,
    store: Arc<dyn InboxStore>,
    options: SyncOptions,
    refresh_lock: Mutex<()>,
}

impl InboxSync {
    pub fn new(
        mail: Arc<dyn MailClient>,
        classifier: Arc<dyn ClassifierClient>,
        notifier: Arc<dyn NotificationSink>,
        store: Arc<dyn InboxStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            mail,
            classifier,
            notifier,
            store,
            options,
            refresh_lock: Mutex::new(()),
        }
    }

    // a failure before the final save leaves the stored cache as it was
    pub async fn refresh(&self, requested: u32) -> AppResult<Vec<ClassifiedMessage>> {
        if requested == 0 {
            return Err(AppError::InvalidInput(
                "requested message count must be greater than 0".to_string(),
            ));
        }

        let _serialized = self.refresh_lock.lock().await;
        let now = SystemTime::now();

        let mut known = self.known_messages(now)?;
        let unread = self.list_unread(requested).await?;
        // a full page may have cut off older unread mail still in the cache
        if unread.len() < requested as usize {
            known = still_unread(known, &unread);
        }
        let new_ids = unseen_ids(&unread, &known);

        tracing::info!(
            known = known.len(),
            unread = unread.len(),
            new = new_ids.len(),
            "reconciled unread listing with cache"
        );

        if new_ids.is_empty() {
            return Ok(known);
        }

        self.classifier.check_credentials()?;

        let mut summaries = Vec::with_capacity(new_ids.len());
        for id in &new_ids {
            summaries.push(self.fetch_detail(id).await?);
        }

        let verdicts = self.classify(&summaries).await?;
        let classified = apply_verdicts(summaries, verdicts);

        for message in classified.iter().filter(|message| message.important) {
            self.notify_once(message).await?;
        }

        let merged = cache::merge(classified, known, self.options.cache_limit);
        let record = CacheRecord::stamped(now, merged);
        self.store.save_cache(&record)?;

        Ok(record.emails)
    }

    pub fn cached(&self) -> AppResult<Vec<ClassifiedMessage>> {
        self.known_messages(SystemTime::now())
    }

    pub async fn apply_label_change(&self, id: &str, change: &LabelChange) -> AppResult<()> {
        if id.trim().is_empty() {
            return Err(AppError::InvalidInput("message id is empty".to_string()));
        }
        if change.is_empty() {
            return Ok(());
        }

        // adding or removing a label twice is harmless, so retry is safe
        retry::retry(self.options.retry, "label change", move || {
            retry::with_timeout(
                "label change",
                self.options.mail_timeout,
                self.mail.modify_labels(id, change),
            )
        })
        .await?;

        tracing::info!(id, add = ?change.add, remove = ?change.remove, "applied label change");
        Ok(())
    }

    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        self.apply_label_change(id, &LabelChange::mark_read()).await
    }

    pub async fn mark_spam(&self, id: &str) -> AppResult<()> {
        self.apply_label_change(id, &LabelChange::mark_spam()).await
    }

    pub async fn reset(&self) -> AppResult<()> {
        let _serialized = self.refresh_lock.lock().await;
        self.store.clear()
    }

    fn known_messages(&self, now: SystemTime) -> AppResult<Vec<ClassifiedMessage>> {
        match self.store.load_cache()? {
            Some(record) if record.is_fresh(now, self.options.freshness) => Ok(record.emails),
            Some(record) => {
                tracing::debug!(cached_at = record.cached_at, "cache is stale, ignoring it");
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    async fn list_unread(&self, requested: u32) -> AppResult<Vec<String>> {
        retry::retry(self.options.retry, "unread listing", move || {
            retry::with_timeout(
                "unread listing",
                self.options.mail_timeout,
                self.mail.list_unread(requested, self.options.since_days),
            )
        })
        .await
    }

    async fn fetch_detail(&self, id: &str) -> AppResult<MessageSummary> {
        retry::retry(self.options.retry, "message detail", move || {
            retry::with_timeout(
                "message detail",
                self.options.mail_timeout,
                self.mail.get_detail(id),
            )
        })
        .await
    }

    async fn classify(&self, summaries: &[MessageSummary]) -> AppResult<Verdicts> {
        let batch = summaries
            .iter()
            .map(|summary| ClassifyItem::from_summary(summary, self.options.use_snippet))
            .collect::<Vec<_>>();

        retry::with_timeout(
            "classifier",
            self.options.classifier_timeout,
            self.classifier.classify(&batch),
        )
        .await
    }

    // flag first so concurrent callers cannot both alert
    async fn notify_once(&self, message: &ClassifiedMessage) -> AppResult<()> {
        if !self.store.mark_notified(&message.id)? {
            tracing::debug!(id = %message.id, "already notified");
            return Ok(());
        }

        let shown = retry::with_timeout(
            "notification",
            self.options.notify_timeout,
            self.notifier.notify(message),
        )
        .await;

        if let Err(err) = shown {
            tracing::warn!(id = %message.id, error = %err, "notification failed");
        }
        Ok(())
    }
}

fn still_unread(known: Vec<ClassifiedMessage>, unread: &[String]) -> Vec<ClassifiedMessage> {
    let listed: HashSet<&str> = unread.iter().map(String::as_str).collect();
    known
        .into_iter()
        .filter(|message| listed.contains(message.id.as_str()))
        .collect()
}

fn unseen_ids(unread: &[String], known: &[ClassifiedMessage]) -> Vec<String> {
    let mut seen: HashSet<&str> = known.iter().map(|message| message.id.as_str()).collect();
    unread
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

// skipped ids are not important; only important mail keeps a reason
fn apply_verdicts(summaries: Vec<MessageSummary>, mut verdicts: Verdicts) -> Vec<ClassifiedMessage> {
    summaries
        .into_iter()
        .map(|summary| {
            let verdict = verdicts.remove(&summary.id).unwrap_or_default();
            let reason = if verdict.important {
                verdict.reason
            } else {
                String::new()
            };
            ClassifiedMessage::new(summary, verdict.important, reason)
        })
        .collect()
}
