use tracing::{debug, debug_span, warn};

use ink_core::modes::PatternRecognitionMode;
use ink_core::recognition::RecognitionRequest;
use ink_core::trace::{InfoMap, TraceHandle, TraceId};

use super::recognition::Stroke;
use super::types::{ActiveTrace, EngineRequest};
use super::TraceInputSession;

impl TraceInputSession {
    /// Pattern mode of the group a new trace would join, if any.
    fn group_mode(&self) -> Option<PatternRecognitionMode> {
        self.capture
            .first()
            .map(|a| a.handle.mode())
            .or_else(|| self.recognition.pending_mode())
    }

    pub(crate) fn begin_trace(
        &mut self,
        mode: PatternRecognitionMode,
        device_info: InfoMap,
        screen_info: InfoMap,
    ) -> Option<TraceHandle> {
        let _span = debug_span!("trace_begin", ?mode).entered();
        let now = self.clock.now();

        if !self.config.pattern_modes.contains(&mode) {
            debug!("pattern mode not supported");
            return None;
        }
        if self.input_mode.is_none() {
            debug!("no input mode selected");
            return None;
        }
        if self.capture.len() >= self.config.max_active_traces {
            debug!(active = self.capture.len(), "too many active traces");
            return None;
        }

        if let Some(group) = self.group_mode() {
            if group != mode {
                debug!(?group, "trace does not fit the open group");
                return None;
            }
        } else if self.recognition.is_awaiting() {
            // The regrouped attempt must stay within the stroke limit.
            let groupable = self.recognition.in_flight_mode() == Some(mode)
                && self.recognition.within_window(now, self.config.group_window)
                && self.recognition.in_flight_len() < self.config.max_strokes;
            if !groupable {
                debug!("recognizer busy with an unrelated attempt");
                return None;
            }
            if let Some(id) = self.recognition.regroup() {
                self.output
                    .requests
                    .push(EngineRequest::CancelRecognition(id));
            }
        } else if !self.preedit.is_empty() {
            // A new word starts; the previous one is accepted as shown.
            self.commit_preedit();
            self.lists.clear_all();
        }

        self.next_trace_id += 1;
        let handle = TraceHandle::new(
            TraceId(self.next_trace_id),
            mode,
            device_info,
            screen_info,
            self.config.max_points,
        );
        debug!(trace = %handle.id(), "trace started");
        self.capture.push(ActiveTrace::new(handle.clone(), now));
        self.flush_selection_events();
        Some(handle)
    }

    pub(crate) fn end_trace(&mut self, trace: &TraceHandle) -> bool {
        let _span = debug_span!("trace_end", trace = %trace.id()).entered();
        let Some(pos) = self.capture.iter().position(|a| a.handle.ptr_eq(trace)) else {
            debug!("trace is not active");
            return false;
        };
        let active = self.capture.remove(pos);
        let sealed = match active.handle.seal() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "trace could not be sealed");
                return false;
            }
        };
        if sealed.points.is_empty() {
            debug!("empty trace discarded");
            active.handle.discard();
            return true;
        }

        let now = self.clock.now();
        self.recognition.push_stroke(
            Stroke {
                sealed,
                handle: active.handle,
            },
            now,
        );
        let group_full = self.recognition.pending_len() >= self.config.max_strokes;
        let no_window = self.config.group_window.is_zero() && self.capture.is_empty();
        if group_full || no_window {
            self.submit_pending();
        }
        self.flush_selection_events();
        true
    }

    /// Send the open group to the recognizer.
    pub(crate) fn submit_pending(&mut self) {
        let Some(input_mode) = self.input_mode else {
            self.recognition.discard_pending();
            return;
        };
        let Some(sub) = self.recognition.submit() else {
            return;
        };
        if let Some(prev) = sub.cancelled {
            self.output
                .requests
                .push(EngineRequest::CancelRecognition(prev));
        }
        debug!(attempt = %sub.attempt, strokes = sub.traces.len(), "attempt submitted");
        self.output
            .requests
            .push(EngineRequest::Recognize(RecognitionRequest {
                attempt: sub.attempt,
                pattern_mode: sub.pattern_mode,
                input_mode,
                locale: self.locale.clone().unwrap_or_default(),
                traces: sub.traces,
                dictionary: self.dictionaries.active(),
                max_candidates: self.config.max_candidates,
            }));
    }

    /// Time-driven housekeeping: abandoned traces, the grouping window and
    /// reselection expiry. Hosts call this periodically.
    pub fn tick(&mut self) {
        let _span = debug_span!("tick").entered();
        let now = self.clock.now();
        let timeout = self.config.inactivity_timeout;

        let mut abandoned = Vec::new();
        self.capture.retain_mut(|a| {
            if a.idle_for(now) >= timeout {
                abandoned.push(a.handle.clone());
                false
            } else {
                true
            }
        });
        for h in abandoned {
            warn!(trace = %h.id(), "trace abandoned by host, discarding");
            h.discard();
        }

        if self.capture.is_empty() && self.recognition.group_expired(now, self.config.group_window) {
            self.submit_pending();
        }
        self.reselect
            .purge_expired(now, self.config.reselect_expiry);
        self.flush_selection_events();
    }
}
