#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use email_radar::api::{ClassifiedMessage, LabelChange, MailClient, MessageSummary};
use email_radar::classifier::{ClassifierClient, ClassifyItem, Verdict, Verdicts};
use email_radar::error::{AppError, AppResult};
use email_radar::notify::NotificationSink;
use email_radar::store::{InboxStore, MemoryStore};
use email_radar::sync::{CacheRecord, InboxSync, RetryPolicy, SyncOptions};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn summary(id: &str) -> MessageSummary {
    MessageSummary {
        id: id.to_string(),
        subject: format!("subject {id}"),
        from: format!("{id}@example.com"),
        snippet: format!("snippet for {id}"),
    }
}

pub fn classified(id: &str, important: bool) -> ClassifiedMessage {
    ClassifiedMessage::new(summary(id), important, String::new())
}

pub fn ids(messages: &[ClassifiedMessage]) -> Vec<&str> {
    messages.iter().map(|message| message.id.as_str()).collect()
}

pub fn record_aged(age: Duration, emails: Vec<ClassifiedMessage>) -> CacheRecord {
    CacheRecord::stamped(SystemTime::now() - age, emails)
}

#[derive(Default)]
pub struct FakeMail {
    pub unread: Mutex<Vec<String>>,
    pub list_failures: Mutex<VecDeque<AppError>>,
    pub hang: Mutex<bool>,
    pub detail_calls: Mutex<Vec<String>>,
    pub label_calls: Mutex<Vec<(String, LabelChange)>>,
}

impl FakeMail {
    pub fn with_unread(ids: &[&str]) -> Self {
        let mail = Self::default();
        mail.set_unread(ids);
        mail
    }

    pub fn set_unread(&self, ids: &[&str]) {
        *lock(&self.unread) = ids.iter().map(|id| id.to_string()).collect();
    }

    pub fn fail_next_list(&self, err: AppError) {
        lock(&self.list_failures).push_back(err);
    }

    pub fn detail_calls(&self) -> Vec<String> {
        lock(&self.detail_calls).clone()
    }

    pub fn label_calls(&self) -> Vec<(String, LabelChange)> {
        lock(&self.label_calls).clone()
    }
}

#[async_trait]
impl MailClient for FakeMail {
    async fn list_unread(&self, max_results: u32, _since_days: u32) -> AppResult<Vec<String>> {
        let hang = *lock(&self.hang);
        if hang {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        let failure = lock(&self.list_failures).pop_front();
        if let Some(err) = failure {
            return Err(err);
        }
        let unread = lock(&self.unread).clone();
        Ok(unread.into_iter().take(max_results as usize).collect())
    }

    async fn get_detail(&self, id: &str) -> AppResult<MessageSummary> {
        lock(&self.detail_calls).push(id.to_string());
        Ok(summary(id))
    }

    async fn modify_labels(&self, id: &str, change: &LabelChange) -> AppResult<()> {
        lock(&self.label_calls).push((id.to_string(), change.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeClassifier {
    pub missing_key: bool,
    pub important: Mutex<Vec<String>>,
    pub skipped: Mutex<Vec<String>>,
    pub fail: Mutex<bool>,
    pub batches: Mutex<Vec<Vec<ClassifyItem>>>,
}

impl FakeClassifier {
    pub fn marking_important(ids: &[&str]) -> Self {
        let classifier = Self::default();
        *lock(&classifier.important) = ids.iter().map(|id| id.to_string()).collect();
        classifier
    }

    pub fn without_key() -> Self {
        Self {
            missing_key: true,
            ..Self::default()
        }
    }

    pub fn skip(&self, id: &str) {
        lock(&self.skipped).push(id.to_string());
    }

    pub fn fail_calls(&self) {
        *lock(&self.fail) = true;
    }

    pub fn batches(&self) -> Vec<Vec<ClassifyItem>> {
        lock(&self.batches).clone()
    }

    pub fn classified_ids(&self) -> Vec<String> {
        self.batches()
            .into_iter()
            .flatten()
            .map(|item| item.id)
            .collect()
    }
}

#[async_trait]
impl ClassifierClient for FakeClassifier {
    fn check_credentials(&self) -> AppResult<()> {
        if self.missing_key {
            return Err(AppError::MissingCredential("no key".to_string()));
        }
        Ok(())
    }

    async fn classify(&self, batch: &[ClassifyItem]) -> AppResult<Verdicts> {
        lock(&self.batches).push(batch.to_vec());
        if *lock(&self.fail) {
            return Err(AppError::ClassifierParse("not json".to_string()));
        }

        let important = lock(&self.important).clone();
        let skipped = lock(&self.skipped).clone();
        Ok(batch
            .iter()
            .filter(|item| !skipped.contains(&item.id))
            .map(|item| {
                let flagged = important.contains(&item.id);
                let verdict = Verdict {
                    important: flagged,
                    reason: if flagged {
                        format!("{} needs a reply", item.id)
                    } else {
                        "newsletter".to_string()
                    },
                };
                (item.id.clone(), verdict)
            })
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub shown: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn shown(&self) -> Vec<String> {
        lock(&self.shown).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, message: &ClassifiedMessage) -> AppResult<()> {
        lock(&self.shown).push(message.id.clone());
        if self.fail {
            return Err(AppError::Api("notifier exited with 1".to_string()));
        }
        Ok(())
    }
}

pub fn fast_options() -> SyncOptions {
    SyncOptions {
        mail_timeout: Duration::from_millis(200),
        classifier_timeout: Duration::from_millis(200),
        retry: RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(1),
        },
        ..SyncOptions::default()
    }
}

pub struct Harness {
    pub mail: Arc<FakeMail>,
    pub classifier: Arc<FakeClassifier>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryStore>,
    pub sync: Arc<InboxSync>,
}

impl Harness {
    pub fn new(mail: FakeMail, classifier: FakeClassifier, store: MemoryStore) -> Self {
        Self::build(mail, classifier, RecordingNotifier::default(), store, fast_options())
    }

    pub fn build(
        mail: FakeMail,
        classifier: FakeClassifier,
        notifier: RecordingNotifier,
        store: MemoryStore,
        options: SyncOptions,
    ) -> Self {
        let mail = Arc::new(mail);
        let classifier = Arc::new(classifier);
        let notifier = Arc::new(notifier);
        let store = Arc::new(store);
        let sync = Arc::new(InboxSync::new(
            Arc::clone(&mail) as Arc<dyn MailClient>,
            Arc::clone(&classifier) as Arc<dyn ClassifierClient>,
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
            Arc::clone(&store) as Arc<dyn InboxStore>,
            options,
        ));

        Self {
            mail,
            classifier,
            notifier,
            store,
            sync,
        }
    }

    pub fn stored(&self) -> Option<CacheRecord> {
        self.store.load_cache().expect("load cache")
    }
}
