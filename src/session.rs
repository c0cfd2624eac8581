// ocr-translator/src/session.rs

// ============================================================================
// MÓDULO SESSION - Controlador do ciclo captura → tradução → exibição
// ============================================================================
//
//   Idle --(gatilho)--> Capturing --(imagem pronta)--> Translating --> Idle
//                 \___________________ erro _______________________/
//
// O gatilho (hotkey ou timer do modo automático) só funciona em Idle.
// O trabalho pesado roda numa thread de fundo que nunca mexe no estado da UI:
// ela manda `WorkerEvent`s por um canal e a thread da UI consome com
// `pump_events()`. Só a thread da UI lê/escreve a fase.
// ============================================================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::history::{History, TranslationResult};
use crate::parser;
use crate::region_selector::CaptureRegion;
use crate::screenshot::{CapturedImage, RegionCapture};
use crate::translator::{Model, Translator};

/// Intervalo mínimo do modo automático (segundos)
pub const MIN_INTERVAL_SECS: u64 = 1;

/// Intervalo máximo do modo automático (segundos)
pub const MAX_INTERVAL_SECS: u64 = 30;

/// Fase do ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Translating,
}

/// Mensagens da thread de fundo para a thread da UI
#[derive(Debug)]
pub enum WorkerEvent {
    /// Imagem gravada, assistente sendo chamado
    Captured(CapturedImage),
    /// Ciclo concluído
    Finished(TranslationResult),
    /// Ciclo abortado (texto já formatado para a barra de status)
    Failed(String),
}

/// Acorda o loop de eventos da UI depois que a thread de fundo envia algo
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Flags da sessão exibidas/alteradas pela UI
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub auto_mode: bool,
    pub interval_secs: u64,
    pub model: Model,
    pub status: String,
}

/// Valores iniciais da sessão
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub model: Model,
    pub auto_mode: bool,
    pub interval_secs: u64,
    /// Nome da tecla de captura, usado nas mensagens de status
    pub capture_key: String,
}

pub struct SessionController {
    state: SessionState,
    history: History,
    capturer: Arc<dyn RegionCapture>,
    translator: Arc<dyn Translator>,
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
    waker: Option<Waker>,
    last_auto_tick: Option<Instant>,
    capture_key: String,
}

impl SessionController {
    pub fn new(
        capturer: Arc<dyn RegionCapture>,
        translator: Arc<dyn Translator>,
        options: SessionOptions,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();

        let mut controller = SessionController {
            state: SessionState {
                phase: Phase::Idle,
                auto_mode: options.auto_mode,
                interval_secs: options
                    .interval_secs
                    .clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS),
                model: options.model,
                status: String::new(),
            },
            history: History::new(),
            capturer,
            translator,
            events_tx,
            events_rx,
            waker: None,
            last_auto_tick: None,
            capture_key: options.capture_key,
        };

        controller.state.status = if controller.state.auto_mode {
            controller.auto_on_status()
        } else {
            controller.idle_status()
        };

        controller
    }

    /// Registra quem acorda a UI quando chega um evento
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    // ========================================================================
    // GATILHOS
    // ========================================================================

    /// Inicia um ciclo para a região. Se já existe um em andamento, não faz nada.
    ///
    /// # Argumentos
    /// * `region` - Região a capturar (geometria atual do seletor)
    ///
    /// # Retorna
    /// * `true` - Uma thread de fundo foi iniciada
    /// * `false` - Já existe um ciclo em andamento
    pub fn trigger(&mut self, region: CaptureRegion) -> bool {
        if self.state.phase != Phase::Idle {
            trace!("⏳ Ciclo em andamento ({:?}), gatilho ignorado", self.state.phase);
            return false;
        }

        info!("");
        info!("▶️  ============================================");
        info!(
            "▶️  CAPTURA: {}x{} em ({}, {}) [{}]",
            region.width,
            region.height,
            region.left,
            region.top,
            self.state.model.id()
        );
        info!("▶️  ============================================");

        self.state.phase = Phase::Capturing;
        self.state.status = "Capturing...".to_string();

        let capturer = Arc::clone(&self.capturer);
        let translator = Arc::clone(&self.translator);
        let tx = self.events_tx.clone();
        let waker = self.waker.clone();
        let model = self.state.model;

        thread::spawn(move || {
            let send = |event: WorkerEvent| {
                // A UI pode já ter fechado; nesse caso o resultado é descartado
                let _ = tx.send(event);
                if let Some(wake) = &waker {
                    wake();
                }
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                run_cycle(capturer.as_ref(), translator.as_ref(), &region, model, &send)
            }));

            match outcome {
                Ok(Ok(result)) => send(WorkerEvent::Finished(result)),
                Ok(Err(message)) => send(WorkerEvent::Failed(message)),
                Err(_) => {
                    error!("❌ Thread de tradução entrou em pânico");
                    send(WorkerEvent::Failed(
                        "Error: translation worker crashed".to_string(),
                    ));
                }
            }
        });

        true
    }

    /// Tick do timer do modo automático.
    ///
    /// Um tick acontece a cada `interval_secs`; ele só inicia um ciclo se a
    /// fase for `Idle`. Ticks que caem durante um ciclo são perdidos.
    pub fn tick_auto(&mut self, now: Instant, region: CaptureRegion) -> bool {
        if !self.state.auto_mode {
            return false;
        }

        let interval = Duration::from_secs(self.state.interval_secs);
        let due = match self.last_auto_tick {
            Some(last) => now.saturating_duration_since(last) >= interval,
            None => true,
        };
        if !due {
            return false;
        }

        self.last_auto_tick = Some(now);

        if self.state.phase != Phase::Idle {
            trace!("⏳ Tick automático ignorado ({:?})", self.state.phase);
            return false;
        }

        self.trigger(region)
    }

    /// Consome os eventos da thread de fundo (chamar só na thread da UI)
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;

        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;

            match event {
                WorkerEvent::Captured(image) => {
                    trace!("🖼️  Captura pronta: {}", image.path.display());
                    if self.state.phase == Phase::Capturing {
                        self.state.phase = Phase::Translating;
                        self.state.status = "Translating...".to_string();
                    }
                }
                WorkerEvent::Finished(result) => {
                    info!("✅ Tradução exibida");
                    self.history.record(result);
                    self.state.phase = Phase::Idle;
                    self.state.status = self.idle_status();
                }
                WorkerEvent::Failed(message) => {
                    error!("❌ {}", message);
                    self.state.phase = Phase::Idle;
                    self.state.status = message;
                }
            }
        }

        handled
    }

    // ========================================================================
    // CONTROLES DA UI
    // ========================================================================

    pub fn toggle_auto(&mut self) {
        self.state.auto_mode = !self.state.auto_mode;

        if self.state.auto_mode {
            // Primeiro tick acontece imediatamente
            self.last_auto_tick = None;
            self.state.status = self.auto_on_status();
            info!("🔁 Modo automático: ✅ ATIVADO ({}s)", self.state.interval_secs);
        } else {
            self.state.status = format!("Auto mode OFF - Press {} to capture", self.capture_key);
            info!("🔁 Modo automático: ❌ DESATIVADO");
        }
    }

    /// Altera o intervalo do modo automático (limitado a 1-30s)
    pub fn set_interval(&mut self, secs: u64) {
        let secs = secs.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        if secs == self.state.interval_secs {
            return;
        }

        self.state.interval_secs = secs;
        if self.state.auto_mode {
            self.state.status = self.auto_on_status();
        }
    }

    pub fn toggle_model(&mut self) {
        let model = self.state.model.toggled();
        self.state.model = model;
        self.state.status = format!("Model: {} ({})", model.label(), model.description());
        info!("🤖 Modelo: {}", model.id());
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Mensagem avulsa na barra de status (ex: troca de tema)
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.state.status = status.into();
    }

    fn idle_status(&self) -> String {
        format!("Press {} to capture", self.capture_key)
    }

    fn auto_on_status(&self) -> String {
        format!("Auto mode ON - capturing every {}s", self.state.interval_secs)
    }
}

/// Captura → assistente → parse. Roda na thread de fundo.
fn run_cycle(
    capturer: &dyn RegionCapture,
    translator: &dyn Translator,
    region: &CaptureRegion,
    model: Model,
    send: &dyn Fn(WorkerEvent),
) -> Result<TranslationResult, String> {
    info!("📸 [1/3] Capturando tela...");
    let image = capturer
        .capture(region)
        .map_err(|e| format!("Error: {}", e))?;

    send(WorkerEvent::Captured(image.clone()));

    info!("🌐 [2/3] Traduzindo com {}...", model.label());
    let response = translator.translate(&image, model);

    info!("🔍 [3/3] Interpretando resposta...");
    let parsed = parser::parse_response(&response);
    if parsed.is_empty() {
        warn!("⚠️  Resposta sem seções reconhecidas, exibindo texto cru");
    }

    Ok(TranslationResult::from_reply(&response, parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SEE_BELOW_PLACEHOLDER;
    use crate::screenshot::CaptureError;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const REGION: CaptureRegion = CaptureRegion {
        left: 100,
        top: 500,
        width: 800,
        height: 200,
    };

    struct FakeCapture {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeCapture {
        fn ok() -> Arc<Self> {
            Arc::new(FakeCapture {
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(FakeCapture {
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl RegionCapture for FakeCapture {
        fn capture(&self, region: &CaptureRegion) -> Result<CapturedImage, CaptureError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(CaptureError::Grab("monitor desligado".to_string()));
            }
            Ok(CapturedImage {
                path: PathBuf::from(format!("/tmp/capture_{}.jpg", n)),
                width: region.width,
                height: region.height,
            })
        }
    }

    /// Assistente falso; com `gate`, cada chamada espera uma liberação
    struct FakeTranslator {
        reply: String,
        gate: Option<Receiver<()>>,
        calls: AtomicUsize,
        models: Mutex<Vec<Model>>,
    }

    impl FakeTranslator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(FakeTranslator {
                reply: reply.to_string(),
                gate: None,
                calls: AtomicUsize::new(0),
                models: Mutex::new(Vec::new()),
            })
        }

        fn gated(reply: &str) -> (Arc<Self>, Sender<()>) {
            let (release, gate) = unbounded();
            let translator = Arc::new(FakeTranslator {
                reply: reply.to_string(),
                gate: Some(gate),
                calls: AtomicUsize::new(0),
                models: Mutex::new(Vec::new()),
            });
            (translator, release)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Translator for FakeTranslator {
        fn translate(&self, _image: &CapturedImage, model: Model) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.models.lock().unwrap().push(model);
            if let Some(gate) = &self.gate {
                let _ = gate.recv_timeout(Duration::from_secs(10));
            }
            self.reply.clone()
        }
    }

    struct PanickingTranslator;

    impl Translator for PanickingTranslator {
        fn translate(&self, _image: &CapturedImage, _model: Model) -> String {
            panic!("assistente explodiu");
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            model: Model::Haiku,
            auto_mode: false,
            interval_secs: 5,
            capture_key: "F1".to_string(),
        }
    }

    fn controller(
        capture: Arc<dyn RegionCapture>,
        translator: Arc<dyn Translator>,
    ) -> SessionController {
        SessionController::new(capture, translator, options())
    }

    fn wait_until(controller: &mut SessionController, done: impl Fn(&SessionController) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            controller.pump_events();
            if done(controller) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("tempo esgotado esperando o controlador ({:?})", controller.phase());
    }

    fn wait_for_calls(translator: &FakeTranslator, expected: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while translator.calls() < expected {
            assert!(Instant::now() < deadline, "assistente não foi chamado");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn full_cycle_records_history_and_returns_to_idle() {
        let translator = FakeTranslator::replying("JAPANESE:\nこんにちは\nENGLISH:\nHello\n");
        let mut session = controller(FakeCapture::ok(), translator.clone());

        assert_eq!(session.state().status, "Press F1 to capture");
        assert!(session.trigger(REGION));
        assert_eq!(session.phase(), Phase::Capturing);
        assert_eq!(session.state().status, "Capturing...");

        wait_until(&mut session, |s| s.phase() == Phase::Idle);

        assert_eq!(session.history().len(), 1);
        let current = session.history().current().unwrap();
        assert_eq!(current.source, "こんにちは");
        assert_eq!(current.translated, "Hello");
        assert_eq!(session.state().status, "Press F1 to capture");
        assert_eq!(*translator.models.lock().unwrap(), vec![Model::Haiku]);
    }

    #[test]
    fn second_trigger_while_busy_is_a_noop() {
        let (translator, release) = FakeTranslator::gated("ENGLISH:\nHi");
        let capture = FakeCapture::ok();
        let mut session = controller(capture.clone(), translator.clone());

        assert!(session.trigger(REGION));
        assert!(!session.trigger(REGION));

        wait_for_calls(&translator, 1);
        session.pump_events();
        assert_eq!(session.phase(), Phase::Translating);
        assert_eq!(session.state().status, "Translating...");

        assert!(!session.trigger(REGION));
        assert_eq!(session.history().len(), 0);

        release.send(()).unwrap();
        wait_until(&mut session, |s| s.phase() == Phase::Idle);

        assert_eq!(session.history().len(), 1);
        assert_eq!(translator.calls(), 1);
        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_mode_never_overlaps_a_slow_cycle() {
        let (translator, release) = FakeTranslator::gated("ENGLISH:\nHi");
        let mut session = controller(FakeCapture::ok(), translator.clone());
        session.toggle_auto();
        assert_eq!(session.state().status, "Auto mode ON - capturing every 5s");

        let start = Instant::now();
        assert!(session.tick_auto(start, REGION));

        // Vários ticks enquanto o assistente está "lento"
        for secs in [5, 10, 15, 20] {
            session.pump_events();
            assert!(!session.tick_auto(start + Duration::from_secs(secs), REGION));
        }
        wait_for_calls(&translator, 1);
        assert_eq!(translator.calls(), 1);

        release.send(()).unwrap();
        wait_until(&mut session, |s| s.phase() == Phase::Idle);
        assert_eq!(session.history().len(), 1);

        // Próximo tick depois do intervalo dispara de novo
        assert!(!session.tick_auto(start + Duration::from_secs(22), REGION));
        assert!(session.tick_auto(start + Duration::from_secs(25), REGION));

        release.send(()).unwrap();
        wait_until(&mut session, |s| s.phase() == Phase::Idle);
        assert_eq!(translator.calls(), 2);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn ticks_do_nothing_when_auto_mode_is_off() {
        let translator = FakeTranslator::replying("ENGLISH:\nHi");
        let mut session = controller(FakeCapture::ok(), translator.clone());

        let start = Instant::now();
        for secs in 0..40 {
            assert!(!session.tick_auto(start + Duration::from_secs(secs), REGION));
        }
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(translator.calls(), 0);
    }

    #[test]
    fn capture_failure_goes_back_to_idle_with_error_status() {
        let translator = FakeTranslator::replying("unused");
        let mut session = controller(FakeCapture::failing(), translator.clone());

        assert!(session.trigger(REGION));
        wait_until(&mut session, |s| s.phase() == Phase::Idle);

        assert!(session.state().status.starts_with("Error: "));
        assert!(session.state().status.contains("monitor desligado"));
        assert_eq!(session.history().len(), 0);
        assert_eq!(translator.calls(), 0);

        // Depois do erro, um novo ciclo pode começar
        assert!(session.trigger(REGION));
    }

    #[test]
    fn worker_panic_is_reported_as_status() {
        let mut session = controller(FakeCapture::ok(), Arc::new(PanickingTranslator));

        assert!(session.trigger(REGION));
        wait_until(&mut session, |s| s.phase() == Phase::Idle);

        assert!(session.state().status.starts_with("Error: "));
        assert_eq!(session.history().len(), 0);
    }

    #[test]
    fn unparseable_reply_is_still_shown() {
        let raw = "Sorry, I can't see any text.";
        let mut session = controller(FakeCapture::ok(), FakeTranslator::replying(raw));

        session.trigger(REGION);
        wait_until(&mut session, |s| s.phase() == Phase::Idle);

        let current = session.history().current().unwrap();
        assert_eq!(current.source, SEE_BELOW_PLACEHOLDER);
        assert_eq!(current.translated, raw);
    }

    #[test]
    fn waker_is_called_for_worker_events() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let mut session = controller(FakeCapture::ok(), FakeTranslator::replying("ENGLISH:\nHi"));
        session.set_waker(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        session.trigger(REGION);
        wait_until(&mut session, |s| s.phase() == Phase::Idle);

        // Captured + Finished
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn model_toggle_affects_next_cycle() {
        let translator = FakeTranslator::replying("ENGLISH:\nHi");
        let mut session = controller(FakeCapture::ok(), translator.clone());

        session.toggle_model();
        assert_eq!(session.state().model, Model::Sonnet);
        assert_eq!(session.state().status, "Model: Sonnet (higher quality)");

        session.trigger(REGION);
        wait_until(&mut session, |s| s.phase() == Phase::Idle);
        assert_eq!(*translator.models.lock().unwrap(), vec![Model::Sonnet]);

        session.toggle_model();
        assert_eq!(session.state().status, "Model: Haiku (faster)");
    }

    #[test]
    fn interval_is_clamped_and_reported_in_auto_mode() {
        let mut session = controller(FakeCapture::ok(), FakeTranslator::replying(""));

        session.set_interval(0);
        assert_eq!(session.state().interval_secs, 1);
        session.set_interval(99);
        assert_eq!(session.state().interval_secs, 30);

        session.toggle_auto();
        session.set_interval(12);
        assert_eq!(session.state().status, "Auto mode ON - capturing every 12s");

        session.toggle_auto();
        assert_eq!(session.state().status, "Auto mode OFF - Press F1 to capture");
    }

    #[test]
    fn clear_keeps_the_current_translation() {
        let mut session = controller(FakeCapture::ok(), FakeTranslator::replying("ENGLISH:\nHi"));

        for _ in 0..3 {
            session.trigger(REGION);
            wait_until(&mut session, |s| s.phase() == Phase::Idle);
        }
        assert_eq!(session.history().len(), 3);

        session.clear_history();
        assert_eq!(session.history().len(), 0);
        assert!(session.history().current().is_some());
    }
}
