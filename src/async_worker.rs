use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, debug_span, warn};

use ink_core::dict::DictionaryLoader;
use ink_core::recognition::{AttemptId, RecognitionRequest, Recognizer, RecognizerError};
use ink_session::Completion;

/// No attempt wanted.
const NONE: u64 = 0;

// ---------------------------------------------------------------------------
// AsyncWorker
// ---------------------------------------------------------------------------

/// Background threads for the recognizer and the dictionary loader. Both
/// report into one completion channel drained on the owner thread.
pub(crate) struct AsyncWorker {
    recognize_tx: mpsc::Sender<RecognitionRequest>,
    dictionary_tx: mpsc::Sender<String>,
    completion_rx: Mutex<mpsc::Receiver<Completion>>,
    /// Attempt whose result is still wanted. Work for any other attempt is
    /// skipped, and its result withheld.
    current: Arc<AtomicU64>,
}

impl AsyncWorker {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        loader: Arc<dyn DictionaryLoader>,
    ) -> io::Result<Self> {
        let current = Arc::new(AtomicU64::new(NONE));
        let (completion_tx, completion_rx) = mpsc::channel::<Completion>();

        // Recognizer worker
        let (recognize_tx, recognize_rx) = mpsc::channel::<RecognitionRequest>();
        {
            let tx = completion_tx.clone();
            let current = Arc::clone(&current);
            thread::Builder::new()
                .name("ink-recognizer".into())
                .spawn(move || recognition_worker(recognize_rx, tx, current, recognizer))?;
        }

        // Dictionary worker
        let (dictionary_tx, dictionary_rx) = mpsc::channel::<String>();
        thread::Builder::new()
            .name("ink-dictionary".into())
            .spawn(move || dictionary_worker(dictionary_rx, completion_tx, loader))?;

        Ok(Self {
            recognize_tx,
            dictionary_tx,
            completion_rx: Mutex::new(completion_rx),
            current,
        })
    }

    pub fn submit_recognition(&self, request: RecognitionRequest) {
        self.current.store(request.attempt.0, Ordering::SeqCst);
        if self.recognize_tx.send(request).is_err() {
            warn!("recognizer worker is gone");
        }
    }

    /// Withdraw interest in `attempt`. A newer attempt already submitted
    /// stays current.
    pub fn cancel_recognition(&self, attempt: AttemptId) {
        let _ = self
            .current
            .compare_exchange(attempt.0, NONE, Ordering::SeqCst, Ordering::SeqCst);
    }

    pub fn load_dictionary(&self, uri: String) {
        if self.dictionary_tx.send(uri).is_err() {
            warn!("dictionary worker is gone");
        }
    }

    pub fn try_recv(&self) -> Option<Completion> {
        let rx = self.completion_rx.lock().ok()?;
        rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        let rx = self.completion_rx.lock().ok()?;
        rx.recv_timeout(timeout).ok()
    }
}

// ---------------------------------------------------------------------------
// Worker threads
// ---------------------------------------------------------------------------

fn is_current(current: &AtomicU64, attempt: AttemptId) -> bool {
    current.load(Ordering::SeqCst) == attempt.0
}

fn recognition_worker(
    rx: mpsc::Receiver<RecognitionRequest>,
    tx: mpsc::Sender<Completion>,
    current: Arc<AtomicU64>,
    recognizer: Arc<dyn Recognizer>,
) {
    while let Ok(request) = rx.recv() {
        // Drain: only the newest attempt can still be wanted
        let mut latest = request;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        let attempt = latest.attempt;
        if !is_current(&current, attempt) {
            debug!(%attempt, "skipping cancelled attempt");
            continue;
        }

        let _span = debug_span!("recognize", %attempt, traces = latest.traces.len()).entered();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| recognizer.recognize(&latest)))
            .unwrap_or_else(|_| Err(RecognizerError::Engine("recognizer panicked".into())));

        // Check staleness after recognition
        if !is_current(&current, attempt) {
            debug!(%attempt, "attempt cancelled during recognition");
            continue;
        }

        if tx.send(Completion::Recognition { attempt, outcome }).is_err() {
            break;
        }
    }
}

fn dictionary_worker(
    rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<Completion>,
    loader: Arc<dyn DictionaryLoader>,
) {
    while let Ok(uri) = rx.recv() {
        let result = loader.load(&uri).map(Arc::new);
        if tx.send(Completion::Dictionary { uri, result }).is_err() {
            break;
        }
    }
}
