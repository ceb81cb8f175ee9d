//! Web Speech API adapter.
//!
//! Synthesis through `speechSynthesis`, single-shot recognition through
//! `SpeechRecognition` (or the `webkit` prefixed constructor). Anything the
//! browser lacks is reported through `is_available` / errors and never panics.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::{self, Either};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use web_sys::{SpeechRecognition, SpeechRecognitionEvent, SpeechSynthesis, SpeechSynthesisUtterance, SpeechSynthesisVoice};

use kairos_core::ports::VoicePort;
use kairos_core::speech::{VoiceInfo, pick_voice};
use kairos_types::{KioskError, Result, config::VoiceConfig};

const RECOGNITION_CONSTRUCTORS: &[&str] = &["SpeechRecognition", "webkitSpeechRecognition"];

/// Recognition errors after which the microphone is never tried again
const FATAL_RECOGNITION_ERRORS: &[&str] = &["not-allowed", "service-not-allowed", "audio-capture"];

pub struct WebSpeechVoice {
    synth: Option<SpeechSynthesis>,
    recognition_ctor: RefCell<Option<js_sys::Function>>,
    enabled: Cell<bool>,
    voice: RefCell<Option<SpeechSynthesisVoice>>,
    config: VoiceConfig,
    timeout_ms: u32,
}

impl WebSpeechVoice {
    pub fn new(config: &VoiceConfig, timeout_ms: u64) -> Self {
        let window = gloo_utils::window();
        let synth = window.speech_synthesis().ok();
        let recognition_ctor = RECOGNITION_CONSTRUCTORS.iter().find_map(|name| {
            js_sys::Reflect::get(&window, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
        });

        if synth.is_none() {
            log::warn!("speechSynthesis unavailable; voice output disabled");
        }
        if recognition_ctor.is_none() {
            log::warn!("SpeechRecognition unavailable; dictation disabled");
        }

        Self {
            enabled: Cell::new(config.enabled && synth.is_some()),
            synth,
            recognition_ctor: RefCell::new(recognition_ctor),
            voice: RefCell::new(None),
            config: config.clone(),
            timeout_ms: timeout_ms.min(u32::MAX as u64) as u32,
        }
    }

    pub fn can_listen(&self) -> bool {
        self.recognition_ctor.borrow().is_some()
    }

    /// Pick the best voice once the browser has loaded its list.
    fn ensure_voice(&self, synth: &SpeechSynthesis) {
        if self.voice.borrow().is_some() {
            return;
        }
        let voices: Vec<SpeechSynthesisVoice> = synth
            .get_voices()
            .iter()
            .map(|v| v.unchecked_into::<SpeechSynthesisVoice>())
            .collect();
        let infos: Vec<VoiceInfo> = voices
            .iter()
            .map(|v| VoiceInfo {
                name: v.name(),
                lang: v.lang(),
                is_default: v.default(),
            })
            .collect();
        if let Some(idx) = pick_voice(&infos, &self.config.language) {
            log::info!("Voice selected: {} ({})", infos[idx].name, infos[idx].lang);
            *self.voice.borrow_mut() = voices.into_iter().nth(idx);
        }
    }

    fn new_recognition(&self) -> Result<SpeechRecognition> {
        let ctor = self
            .recognition_ctor
            .borrow()
            .clone()
            .ok_or_else(|| KioskError::Voice("SpeechRecognition unavailable".to_string()))?;
        let instance = js_sys::Reflect::construct(&ctor, &js_sys::Array::new())
            .map_err(|e| KioskError::JsInterop(format!("{:?}", e)))?;
        // webkitSpeechRecognition is not an instanceof SpeechRecognition
        let recognition: SpeechRecognition = instance.unchecked_into();
        recognition.set_lang(&self.config.language);
        recognition.set_continuous(false);
        recognition.set_interim_results(false);
        recognition.set_max_alternatives(1);
        Ok(recognition)
    }
}

#[async_trait(?Send)]
impl VoicePort for WebSpeechVoice {
    fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled && self.synth.is_some());
    }

    fn speak(&self, text: &str) {
        let Some(synth) = self.synth.as_ref() else { return };
        if !self.enabled.get() || text.trim().is_empty() {
            return;
        }
        synth.cancel();
        self.ensure_voice(synth);

        let utterance = match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(u) => u,
            Err(e) => {
                log::warn!("Cannot create utterance: {:?}", e);
                return;
            }
        };
        utterance.set_lang(&self.config.language);
        utterance.set_rate(self.config.rate);
        utterance.set_pitch(self.config.pitch);
        if let Some(voice) = self.voice.borrow().as_ref() {
            utterance.set_voice(Some(voice));
        }
        synth.speak(&utterance);
    }

    fn cancel(&self) {
        if let Some(synth) = self.synth.as_ref() {
            synth.cancel();
        }
    }

    async fn listen(&self) -> Result<String> {
        let recognition = self.new_recognition()?;
        let (tx, rx) = oneshot::channel::<Result<String>>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let tx_result = tx.clone();
        let onresult = Closure::<dyn FnMut(SpeechRecognitionEvent)>::new(move |event: SpeechRecognitionEvent| {
            let transcript = event
                .results()
                .and_then(|list| list.get(0))
                .and_then(|result| result.get(0))
                .map(|alt| alt.transcript())
                .unwrap_or_default();
            if let Some(tx) = tx_result.borrow_mut().take() {
                let _ = tx.send(Ok(transcript));
            }
        });

        let tx_error = tx.clone();
        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let code = js_sys::Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown".to_string());
            if let Some(tx) = tx_error.borrow_mut().take() {
                let _ = tx.send(Err(KioskError::Voice(code)));
            }
        });

        let tx_end = tx.clone();
        let onend = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx_end.borrow_mut().take() {
                let _ = tx.send(Err(KioskError::Voice("no-speech".to_string())));
            }
        });

        recognition.set_onresult(Some(onresult.as_ref().unchecked_ref()));
        recognition.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        recognition.set_onend(Some(onend.as_ref().unchecked_ref()));

        self.cancel();
        recognition
            .start()
            .map_err(|e| KioskError::Voice(format!("{:?}", e)))?;
        log::debug!("Listening ({})", self.config.language);

        let outcome = match future::select(rx, Box::pin(TimeoutFuture::new(self.timeout_ms))).await {
            Either::Left((Ok(result), _)) => result,
            Either::Left((Err(_), _)) => Err(KioskError::Voice("recognition dropped".to_string())),
            Either::Right(_) => {
                recognition.abort();
                Err(KioskError::Voice("timeout".to_string()))
            }
        };

        recognition.set_onresult(None);
        recognition.set_onerror(None);
        recognition.set_onend(None);

        if let Err(KioskError::Voice(code)) = &outcome {
            if FATAL_RECOGNITION_ERRORS.contains(&code.as_str()) {
                log::warn!("Dictation disabled after '{}'", code);
                *self.recognition_ctor.borrow_mut() = None;
            }
        }
        outcome
    }
}
