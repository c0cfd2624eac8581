// ocr-translator/src/config.rs

// ============================================================================
// MÓDULO CONFIG - Configurações da aplicação
// ============================================================================
// O config.json é só lido. Se não existir (ou faltar algum campo), os valores
// padrão são usados. Nada é gravado em disco.
// ============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::session::{MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};
use crate::translator::Model;

/// Posição e tamanho iniciais da região de captura
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        RegionConfig {
            x: 100,
            y: 500,
            width: 800,
            height: 200,
        }
    }
}

/// Posição e tamanho da janela de tradução
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            x: 950.0,
            y: 100.0,
            width: 600.0,
            height: 750.0,
        }
    }
}

/// Uma tecla de atalho: modificador opcional + tecla
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// "", "Ctrl", "Shift" ou "Alt"
    #[serde(default)]
    pub modifier: String,
    pub key: String,
}

impl HotkeyBinding {
    pub fn key(key: &str) -> Self {
        HotkeyBinding {
            modifier: String::new(),
            key: key.to_string(),
        }
    }

    /// Nome legível ("F1", "Ctrl+T")
    pub fn label(&self) -> String {
        if self.modifier.is_empty() {
            self.key.clone()
        } else {
            format!("{}+{}", self.modifier, self.key)
        }
    }
}

/// Teclas de atalho globais
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub capture: HotkeyBinding,
    pub quit: HotkeyBinding,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        HotkeyConfig {
            capture: HotkeyBinding::key("F1"),
            quit: HotkeyBinding::key("Escape"),
        }
    }
}

/// Configuração do CLI do assistente
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Nome (ou caminho) do executável
    pub command: String,
    /// Modelo inicial
    pub model: Model,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            command: "claude".to_string(),
            model: Model::Haiku,
        }
    }
}

/// Configuração do modo automático
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfig {
    pub enabled: bool,
    /// Intervalo entre capturas (1-30 segundos)
    pub interval_secs: u64,
}

impl Default for AutoConfig {
    fn default() -> Self {
        AutoConfig {
            enabled: false,
            interval_secs: 5,
        }
    }
}

/// Estrutura principal de configuração
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub region: RegionConfig,
    pub window: WindowConfig,
    pub hotkeys: HotkeyConfig,
    pub assistant: AssistantConfig,
    pub auto: AutoConfig,
    /// Nome do tema inicial ("Cyber Blue", "Matrix", ...)
    pub theme: String,
}

impl AppConfig {
    /// Caminho do arquivo de configuração
    const CONFIG_FILE: &'static str = "config.json";

    /// Carrega configurações do config.json (ou usa os padrões se não existir)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(Self::CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        info!("📋 Carregando configurações...");

        if !path.exists() {
            warn!("⚠️  {} não encontrado, usando valores padrão", path.display());
            return Ok(AppConfig::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Falha ao ler {}", path.display()))?;

        let mut config: AppConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Falha ao parsear {}", path.display()))?;

        config.normalize();

        info!("✅ Configurações carregadas de {}", path.display());
        info!(
            "   📍 Região: {}x{} na posição ({}, {})",
            config.region.width, config.region.height, config.region.x, config.region.y
        );
        info!("   🤖 Assistente: {} ({})", config.assistant.command, config.assistant.model.id());

        Ok(config)
    }

    /// Corrige valores fora da faixa aceita
    fn normalize(&mut self) {
        let clamped = self
            .auto
            .interval_secs
            .clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        if clamped != self.auto.interval_secs {
            warn!(
                "⚠️  Intervalo {}s fora da faixa, usando {}s",
                self.auto.interval_secs, clamped
            );
            self.auto.interval_secs = clamped;
        }

        if self.assistant.command.trim().is_empty() {
            self.assistant.command = AssistantConfig::default().command;
        }
    }
}
