//! Async driver for a form session
//!
//! Wraps a [`FormSession`] in a `tokio` mutex and implements the debounced
//! answer choice: take the guard, sleep, settle. The lock is never held across
//! the sleep, so other operations proceed while a choice is pending.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    field::RawValue,
    session::{ChoiceOutcome, FormSession},
};

/// Default delay between taking and applying an answer choice
pub const DEFAULT_ANSWER_DEBOUNCE: Duration = Duration::from_millis(50);

/// Shared handle on one form session
#[derive(Clone)]
pub struct FormController {
    session: Arc<Mutex<FormSession>>,
    debounce: Duration,
}

impl FormController {
    pub fn new(session: FormSession, debounce: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            debounce,
        }
    }

    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Choose an answer for a question.
    ///
    /// A call made while another choice is pending returns
    /// [`ChoiceOutcome::Suppressed`] without touching the session.
    pub async fn choose_answer(&self, question_id: &str, value: impl Into<RawValue>) -> ChoiceOutcome {
        let pending = self.session.lock().await.begin_choice(question_id, value);
        let Some(pending) = pending else {
            return ChoiceOutcome::Suppressed;
        };

        tokio::time::sleep(self.debounce).await;

        self.session.lock().await.settle_choice(pending)
    }

    /// Run a synchronous operation against the session
    pub async fn with_session<T>(&self, f: impl FnOnce(&mut FormSession) -> T) -> T {
        let mut session = self.session.lock().await;
        f(&mut session)
    }
}
