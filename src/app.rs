// ocr-translator/src/app.rs

// ============================================================================
// JANELA PRINCIPAL (roda na main thread)
// ============================================================================
//
// A cada frame:
//   1. processa comandos da thread de hotkeys
//   2. consome eventos da thread de tradução
//   3. tick do modo automático
//   4. desenha a região de captura e a janela principal
// ============================================================================

use crossbeam_channel::Receiver;
use eframe::egui::{self, Color32, RichText};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::history::TranslationResult;
use crate::hotkey::{AppCommand, HotkeyListener};
use crate::region_selector::RegionSelector;
use crate::session::{Phase, SessionController, Waker, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};
use crate::theme::{self, Theme, THEMES};

/// Frequência mínima de redesenho (timer do modo automático)
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

const ERROR_COLOR: Color32 = Color32::from_rgb(0xff, 0x6b, 0x6b);

pub struct TranslatorApp {
    session: SessionController,
    selector: RegionSelector,
    commands: Receiver<AppCommand>,
    // Mantido vivo até a janela fechar; o Drop para a thread
    hotkeys: HotkeyListener,
    theme_index: usize,
}

impl TranslatorApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mut session: SessionController,
        selector: RegionSelector,
        commands: Receiver<AppCommand>,
        hotkeys: HotkeyListener,
        theme_name: &str,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        let waker: Waker = Arc::new(move || ctx.request_repaint());
        session.set_waker(Arc::clone(&waker));
        hotkeys.set_waker(waker);

        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let theme_index = theme::index_of(theme_name);
        info!("🎨 Tema: {}", THEMES[theme_index].name);

        TranslatorApp {
            session,
            selector,
            commands,
            hotkeys,
            theme_index,
        }
    }

    fn theme(&self) -> Theme {
        THEMES[self.theme_index]
    }

    fn process_commands(&mut self, ctx: &egui::Context) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                AppCommand::Capture => {
                    self.session.trigger(self.selector.region());
                }
                AppCommand::Quit => {
                    info!("👋 Encerrando...");
                    self.hotkeys.stop();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }
    }

    fn cycle_theme(&mut self) {
        self.theme_index = theme::next_index(self.theme_index);
        let name = THEMES[self.theme_index].name;
        info!("🎨 Tema: {}", name);
        self.session.set_status(format!("Theme: {}", name));
    }

    // ========================================================================
    // RENDERIZAÇÃO
    // ========================================================================

    fn render_header(&self, ui: &mut egui::Ui, theme: &Theme) {
        egui::Frame::none()
            .fill(theme.header)
            .inner_margin(egui::Margin::symmetric(12.0, 10.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new("OCR Translator")
                        .color(theme.accent)
                        .size(20.0)
                        .strong(),
                );

                let state = self.session.state();
                let color = if state.status.starts_with("Error") {
                    ERROR_COLOR
                } else if self.session.phase() == Phase::Idle {
                    theme.text
                } else {
                    theme.success
                };
                ui.label(RichText::new(&state.status).color(color));
            });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        let auto_on = self.session.state().auto_mode;
        let model = self.session.state().model;
        let overlay_on = self.selector.is_visible();

        ui.horizontal_wrapped(|ui| {
            let auto_label = if auto_on { "Auto: ON" } else { "Auto: OFF" };
            if themed_button(ui, auto_label, auto_on, theme).clicked() {
                self.session.toggle_auto();
            }

            if ui
                .add(egui::Button::new(RichText::new("Clear").color(theme.bg)).fill(theme.accent))
                .clicked()
            {
                self.session.clear_history();
            }

            let overlay_label = if overlay_on { "Overlay: ON" } else { "Overlay: OFF" };
            if themed_button(ui, overlay_label, overlay_on, theme).clicked() {
                self.selector.toggle_visible();
            }

            if themed_button(ui, &format!("Model: {}", model.label()), false, theme).clicked() {
                self.session.toggle_model();
            }

            if themed_button(ui, "Theme", false, theme).clicked() {
                self.cycle_theme();
            }
        });

        ui.horizontal(|ui| {
            ui.label(RichText::new("Interval:").color(theme.text));
            let mut secs = self.session.state().interval_secs;
            let slider = egui::Slider::new(&mut secs, MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS)
                .suffix("s");
            if ui.add(slider).changed() {
                self.session.set_interval(secs);
            }
        });
    }

    fn render_current(&self, ui: &mut egui::Ui, theme: &Theme) {
        let current = self.session.history().current();

        section_frame(ui, theme, |ui| {
            ui.label(RichText::new("Original:").color(theme.accent).strong());
            let source = current.map(|r| r.source.as_str()).unwrap_or("");
            ui.label(RichText::new(source).color(Color32::WHITE).size(15.0));

            ui.add_space(6.0);

            ui.label(RichText::new("Translation:").color(theme.accent).strong());
            let translated = current.map(|r| r.translated.as_str()).unwrap_or("");
            ui.label(RichText::new(translated).color(theme.success).size(15.0));
        });
    }

    fn render_history(&self, ui: &mut egui::Ui, theme: &Theme) {
        let history = self.session.history();
        let entries = history.entries();

        ui.label(
            RichText::new(format!("History ({})", history.len()))
                .color(theme.accent)
                .strong(),
        );

        section_frame(ui, theme, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if history.is_empty() {
                        ui.label(RichText::new("No translations yet.").color(theme.text).weak());
                    }
                    for entry in entries {
                        render_entry(ui, entry, theme);
                    }
                });
        });
    }
}

impl eframe::App for TranslatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_commands(ctx);
        self.session.pump_events();
        self.session.tick_auto(Instant::now(), self.selector.region());

        let theme = self.theme();

        self.selector.show(ctx, &theme);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme.bg).inner_margin(10.0))
            .show(ctx, |ui| {
                self.render_header(ui, &theme);
                ui.add_space(8.0);
                self.render_controls(ui, &theme);
                ui.add_space(8.0);
                self.render_current(ui, &theme);
                ui.add_space(8.0);
                self.render_history(ui, &theme);
            });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }

    /// Transparente para a janela da região; a janela principal pinta o próprio fundo
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }
}

/// Botão com cor de "ativo" ou "inativo" do tema
fn themed_button(ui: &mut egui::Ui, label: &str, active: bool, theme: &Theme) -> egui::Response {
    let (fill, text) = if active {
        (theme.success, theme.bg)
    } else {
        (theme.button, Color32::WHITE)
    };
    ui.add(egui::Button::new(RichText::new(label).color(text)).fill(fill))
}

fn section_frame(ui: &mut egui::Ui, theme: &Theme, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(theme.header)
        .stroke(egui::Stroke::new(1.0, theme.button))
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
}

fn render_entry(ui: &mut egui::Ui, entry: &TranslationResult, theme: &Theme) {
    ui.label(
        RichText::new(entry.render())
            .monospace()
            .color(theme.text),
    );
}
