// ocr-translator/src/main.rs

// ============================================================================
// OCR TRANSLATOR - Captura uma região da tela e traduz o texto japonês
// ============================================================================

#[macro_use]
extern crate log;

// ============================================================================
// DECLARAÇÃO DE MÓDULOS
// ============================================================================
mod app;
mod config;
mod history;
mod hotkey;
mod parser;
mod region_selector;
mod screenshot;
mod session;
mod theme;
mod translator;

mod platform {
    pub mod windows_dialog;
}

// ============================================================================
// IMPORTS
// ============================================================================
use anyhow::{anyhow, bail, Context, Result};
use config::AppConfig;
use crossbeam_channel::unbounded;
use std::sync::Arc;

use app::TranslatorApp;
use hotkey::{AppCommand, HotkeyBindings, HotkeyListener};
use region_selector::{CaptureRegion, RegionSelector};
use screenshot::ScreenCapturer;
use session::{SessionController, SessionOptions};
use translator::ClaudeCli;

const APP_TITLE: &str = "OCR Translator";

// ============================================================================
// FUNÇÃO PRINCIPAL
// ============================================================================
fn main() -> Result<()> {
    env_logger::init();

    if let Err(e) = run() {
        error!("❌ {:#}", e);
        platform::windows_dialog::show_fatal_error(APP_TITLE, &format!("{:#}", e));
        return Err(e);
    }

    info!("👋 Até mais!");
    Ok(())
}

fn run() -> Result<()> {
    info!("🈂️  ============================================");
    info!("🈂️  OCR TRANSLATOR - Japonês → Inglês");
    info!("🈂️  ============================================");
    info!("");

    info!("⚙️  Configurando sistema...");

    let config = AppConfig::load()?;

    // Atalho inválido impede a inicialização
    let bindings = HotkeyBindings::from_config(&config.hotkeys)
        .context("Invalid hotkey in config.json")?;

    // ========================================================================
    // VERIFICA O CLI DO ASSISTENTE
    // ========================================================================
    let cli = ClaudeCli::new(config.assistant.command.clone());
    if !cli.check_available() {
        bail!(
            "Claude CLI not found ('{}'). Install Claude Code and make sure it is on your PATH.",
            cli.program()
        );
    }

    let capturer = ScreenCapturer::new().context("Could not create the capture directory")?;

    let capture_key = config.hotkeys.capture.label();

    info!("📋 Configurações:");
    info!("   🤖 Modelo: {}", config.assistant.model.id());
    info!(
        "   🔁 Modo automático: {} ({}s)",
        if config.auto.enabled { "ligado" } else { "desligado" },
        config.auto.interval_secs
    );
    info!("   ⌨️  Hotkeys:");
    info!("      - {} = Capturar região", capture_key);
    info!("      - {} = Sair", config.hotkeys.quit.label());
    info!("");

    // ========================================================================
    // MONTA A SESSÃO
    // ========================================================================
    let session = SessionController::new(
        Arc::new(capturer),
        Arc::new(cli),
        SessionOptions {
            model: config.assistant.model,
            auto_mode: config.auto.enabled,
            interval_secs: config.auto.interval_secs,
            capture_key,
        },
    );

    let selector = RegionSelector::new(CaptureRegion {
        left: config.region.x,
        top: config.region.y,
        width: config.region.width,
        height: config.region.height,
    });

    let (command_sender, command_receiver) = unbounded::<AppCommand>();
    let hotkeys = HotkeyListener::start(bindings, command_sender);

    info!("✅ Sistema pronto!");
    info!("");

    // ========================================================================
    // JANELA PRINCIPAL NA MAIN THREAD
    // ========================================================================
    let window = &config.window;
    info!("🖼️  Janela: {}x{} em ({}, {})", window.width, window.height, window.x, window.y);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([window.width, window.height])
            .with_min_inner_size([420.0, 360.0])
            .with_position([window.x, window.y])
            .with_always_on_top()
            .with_transparent(true),

        ..Default::default()
    };

    let theme_name = config.theme.clone();

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(TranslatorApp::new(
                cc,
                session,
                selector,
                command_receiver,
                hotkeys,
                &theme_name,
            )))
        }),
    )
    .map_err(|e| anyhow!("UI error: {}", e))?;

    Ok(())
}
